//! Security identifier binary codec
//!
//! Converts between the textual `S-1-...` form and the canonical binary
//! layout the directory stores in `objectSid`: revision byte,
//! sub-authority count byte, 48-bit big-endian identifier authority,
//! then little-endian 32-bit sub-authorities.
//!
//! Both directions return `Option` — malformed input degrades to `None`
//! so callers can fall back (string filter, hex rendering) without ever
//! raising.

/// Maximum sub-authority count in a valid SID.
const MAX_SUB_AUTHORITIES: usize = 15;

/// Parse a textual SID into its canonical binary form.
///
/// Returns `None` for anything that is not a well-formed SID string:
/// wrong prefix, non-numeric groups, an authority beyond 48 bits, or
/// more than 15 sub-authorities.
pub fn parse(text: &str) -> Option<Vec<u8>> {
    let mut parts = text.trim().split('-');

    if !parts.next()?.eq_ignore_ascii_case("s") {
        return None;
    }
    let revision: u8 = parts.next()?.parse().ok()?;
    let authority: u64 = parts.next()?.parse().ok()?;
    if authority >= 1 << 48 {
        return None;
    }

    let mut sub_authorities = Vec::new();
    for part in parts {
        let sub: u32 = part.parse().ok()?;
        sub_authorities.push(sub);
    }
    if sub_authorities.len() > MAX_SUB_AUTHORITIES {
        return None;
    }

    let mut bytes = Vec::with_capacity(8 + 4 * sub_authorities.len());
    bytes.push(revision);
    bytes.push(sub_authorities.len() as u8);
    bytes.extend_from_slice(&authority.to_be_bytes()[2..8]);
    for sub in sub_authorities {
        bytes.extend_from_slice(&sub.to_le_bytes());
    }
    Some(bytes)
}

/// Render a binary SID in its textual `S-1-...` form.
///
/// Returns `None` when the buffer is truncated or its length does not
/// match the declared sub-authority count.
pub fn render(bytes: &[u8]) -> Option<String> {
    if bytes.len() < 8 {
        return None;
    }
    let revision = bytes[0];
    let count = bytes[1] as usize;
    if count > MAX_SUB_AUTHORITIES || bytes.len() != 8 + 4 * count {
        return None;
    }

    let mut authority_bytes = [0u8; 8];
    authority_bytes[2..8].copy_from_slice(&bytes[2..8]);
    let authority = u64::from_be_bytes(authority_bytes);

    let mut text = format!("S-{revision}-{authority}");
    for i in 0..count {
        let offset = 8 + 4 * i;
        let sub = u32::from_le_bytes([
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ]);
        text.push_str(&format!("-{sub}"));
    }
    Some(text)
}
