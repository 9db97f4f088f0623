//! LDAP filter synthesis
//!
//! Builds equality filter terms for each identifier shape, escaping every
//! user-supplied value per the RFC 4515 rule (backslash plus two uppercase
//! hex digits) and encoding SIDs as binary-safe escaped octet sequences.

use crate::identifier::Identifier;
use crate::sid;

/// Escape a value for embedding in a filter expression.
///
/// `\`, `*`, `(`, `)`, and NUL become their two-hex-digit escaped forms.
/// The result never introduces unbalanced parentheses.
pub fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\5C"),
            '*' => escaped.push_str("\\2A"),
            '(' => escaped.push_str("\\28"),
            ')' => escaped.push_str("\\29"),
            '\0' => escaped.push_str("\\00"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Equality term on an arbitrary attribute, value escaped.
pub fn equals(attribute: &str, value: &str) -> String {
    format!("({attribute}={})", escape_value(value))
}

/// Equality term on the account-name attribute.
pub fn account_name(name: &str) -> String {
    equals("sAMAccountName", name)
}

/// Equality term on the mail attribute.
pub fn email(address: &str) -> String {
    equals("mail", address)
}

/// Equality term on the distinguished-name attribute.
pub fn distinguished_name(dn: &str) -> String {
    equals("distinguishedName", dn)
}

/// Equality term on the security-identifier attribute.
///
/// Encodes the SID's canonical binary form as backslash-escaped octets
/// so the server matches on the stored binary value. A malformed SID
/// degrades to a string-equality term with standard escaping; this
/// never errors.
pub fn security_id(sid_text: &str) -> String {
    match sid::parse(sid_text) {
        Some(bytes) => {
            let mut encoded = String::with_capacity(3 * bytes.len());
            for byte in bytes {
                encoded.push_str(&format!("\\{byte:02X}"));
            }
            format!("(objectSid={encoded})")
        }
        None => equals("objectSid", sid_text),
    }
}

/// Wrap already-parenthesized terms in an OR group.
///
/// Lets one round trip resolve N identifiers instead of N round trips.
/// A single term passes through unwrapped; callers supply at least one.
pub fn any_of(terms: &[String]) -> String {
    if terms.len() == 1 {
        return terms[0].clone();
    }
    format!("(|{})", terms.join(""))
}

/// The filter term for a classified identifier.
pub fn for_identifier(identifier: &Identifier) -> String {
    match identifier {
        Identifier::AccountName(name) => account_name(name),
        Identifier::Email(address) => email(address),
        Identifier::SecurityId(sid_text) => security_id(sid_text),
        Identifier::DistinguishedName(dn) => distinguished_name(dn),
    }
}
