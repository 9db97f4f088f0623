//! Attribute value decoding
//!
//! Normalizes protocol-native value encodings into presentation strings:
//! binary security identifiers become SDDL `S-1-...` text, binary GUIDs
//! become dashed hexadecimal, FILETIME tick counts become local-time
//! timestamps, and any other binary becomes plain hex. Decoding never
//! fails — a value that cannot be decoded into its richer form degrades
//! to a hexadecimal or decimal rendering.

use chrono::{DateTime, Local, SecondsFormat, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::entry::AttributeValue;
use crate::sid;

/// Attributes storing 64-bit FILETIME tick counts (case-insensitive).
const FILETIME_ATTRIBUTES: [&str; 9] = [
    "lastLogon",
    "lastLogonTimestamp",
    "pwdLastSet",
    "accountExpires",
    "badPasswordTime",
    "lastLogoff",
    "lockoutTime",
    "whenCreated",
    "whenChanged",
];

/// Seconds between the FILETIME epoch (1601-01-01) and the Unix epoch.
const FILETIME_UNIX_OFFSET_SECS: i64 = 11_644_473_600;

/// FILETIME ticks per second (100-nanosecond intervals).
const TICKS_PER_SECOND: i64 = 10_000_000;

/// A raw attribute value as the transport delivered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    /// A textual value.
    Text(String),
    /// A binary value.
    Binary(Vec<u8>),
}

/// Check whether an attribute holds FILETIME tick counts.
pub fn is_filetime_attribute(name: &str) -> bool {
    FILETIME_ATTRIBUTES
        .iter()
        .any(|attr| attr.eq_ignore_ascii_case(name))
}

/// Decode one raw value into its presentation string.
///
/// First match wins:
/// 1. 16-byte binary under `objectGUID` - dashed GUID (the directory
///    stores the first three fields little-endian).
/// 2. binary under `objectSid` - SDDL `S-1-...`, hex on decode failure.
/// 3. any other binary - uppercase hex, two digits per byte.
/// 4. integer text under a FILETIME attribute - `Never` for 0 or
///    `i64::MAX`, else a local-time RFC 3339 timestamp.
/// 5. integer text otherwise - the decimal string.
/// 6. anything else - the text unchanged.
pub fn decode(attribute_name: &str, raw: &RawValue) -> String {
    match raw {
        RawValue::Binary(bytes) => decode_binary(attribute_name, bytes),
        RawValue::Text(text) => match text.trim().parse::<i64>() {
            Ok(value) if is_filetime_attribute(attribute_name) => decode_filetime(value),
            Ok(value) => value.to_string(),
            Err(_) => text.clone(),
        },
    }
}

/// Decode a value collection, preserving order.
///
/// Each value decodes independently. One value collapses to the scalar
/// form; an empty collection yields `None` so entries never carry empty
/// lists.
pub fn decode_values(attribute_name: &str, values: &[RawValue]) -> Option<AttributeValue> {
    let mut decoded: Vec<String> = values
        .iter()
        .map(|raw| decode(attribute_name, raw))
        .collect();
    match decoded.len() {
        0 => None,
        1 => Some(AttributeValue::Single(decoded.remove(0))),
        _ => Some(AttributeValue::Multi(decoded)),
    }
}

fn decode_binary(attribute_name: &str, bytes: &[u8]) -> String {
    if attribute_name.eq_ignore_ascii_case("objectGUID") && bytes.len() == 16 {
        let mut buf = [0u8; 16];
        buf.copy_from_slice(bytes);
        return Uuid::from_bytes_le(buf).to_string();
    }

    if attribute_name.eq_ignore_ascii_case("objectSid") {
        if let Some(text) = sid::render(bytes) {
            return text;
        }
        debug!(attribute = %attribute_name, len = bytes.len(), "SID decode failed, rendering hex");
    }

    hex_upper(bytes)
}

/// Render a FILETIME tick count.
///
/// 0 and `i64::MAX` both mean "never" in the directory's convention.
/// Values that do not convert to a representable timestamp fall back to
/// the raw decimal string.
pub fn decode_filetime(ticks: i64) -> String {
    if ticks == 0 || ticks == i64::MAX {
        return "Never".to_string();
    }
    if ticks < 0 {
        return ticks.to_string();
    }

    let secs = ticks / TICKS_PER_SECOND - FILETIME_UNIX_OFFSET_SECS;
    let nanos = ((ticks % TICKS_PER_SECOND) * 100) as u32;
    match DateTime::<Utc>::from_timestamp(secs, nanos) {
        Some(utc) => utc
            .with_timezone(&Local)
            .to_rfc3339_opts(SecondsFormat::Secs, false),
        None => ticks.to_string(),
    }
}

fn hex_upper(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02X}")).collect()
}
