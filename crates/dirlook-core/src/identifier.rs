//! Identifier classification
//!
//! Determines which identifier shape a raw input string represents:
//! account name, distinguished name, security identifier, or email
//! address. The heuristics are deliberately permissive (they mirror how
//! operators actually type these values) rather than RFC-conformant
//! parses: a malformed-but-recognizable DN must still classify as a DN.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{LookupError, LookupResult};

/// DN heuristic: a CN=/OU=/DC= key, with or without space before the `=`.
static DN_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:cn|ou|dc)\s*=").expect("valid regex"));

/// SID shape: `S-` followed by at least two dash-separated numeric groups.
static SID_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^s-\d+(?:-\d+)+$").expect("valid regex"));

/// Account-name shape: 1-20 characters of word chars, `.`, `$`, `-`.
static ACCOUNT_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.$-]{1,20}$").expect("valid regex"));

/// Permissive email shape: one `@`, dotted domain, no whitespace.
static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex"));

/// The kind of identifier a string classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentifierKind {
    /// SAM account name (e.g., `jsmith`, `SVC-BACKUP$`).
    AccountName,
    /// Distinguished name (e.g., `CN=J Smith,OU=Sales,DC=corp,DC=example,DC=com`).
    DistinguishedName,
    /// Security identifier in textual form (e.g., `S-1-5-21-...`).
    SecurityId,
    /// Email address.
    Email,
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IdentifierKind::AccountName => "AccountName",
            IdentifierKind::DistinguishedName => "DistinguishedName",
            IdentifierKind::SecurityId => "SecurityId",
            IdentifierKind::Email => "Email",
        };
        f.write_str(name)
    }
}

/// A classified identifier. Exactly one variant; immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Identifier {
    /// SAM account name.
    AccountName(String),
    /// Distinguished name.
    DistinguishedName(String),
    /// Textual security identifier.
    SecurityId(String),
    /// Email address.
    Email(String),
}

impl Identifier {
    /// The kind of this identifier.
    pub fn kind(&self) -> IdentifierKind {
        match self {
            Identifier::AccountName(_) => IdentifierKind::AccountName,
            Identifier::DistinguishedName(_) => IdentifierKind::DistinguishedName,
            Identifier::SecurityId(_) => IdentifierKind::SecurityId,
            Identifier::Email(_) => IdentifierKind::Email,
        }
    }

    /// The raw classified value.
    pub fn value(&self) -> &str {
        match self {
            Identifier::AccountName(s)
            | Identifier::DistinguishedName(s)
            | Identifier::SecurityId(s)
            | Identifier::Email(s) => s,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind(), self.value())
    }
}

/// Classify a raw input string into exactly one identifier variant.
///
/// The DN heuristic runs first (account names never contain `=`, so it
/// cannot shadow them). The SID shape is tested before the account-name
/// shape because every textual SID is also a valid account-name string;
/// the more specific shape wins. Inputs matching no shape are rejected.
pub fn classify(raw: &str) -> LookupResult<Identifier> {
    let input = raw.trim();
    if input.is_empty() {
        return Err(LookupError::classification("empty input"));
    }

    if input.contains('=') && DN_KEY.is_match(input) {
        return Ok(Identifier::DistinguishedName(input.to_string()));
    }
    if SID_SHAPE.is_match(input) {
        return Ok(Identifier::SecurityId(input.to_string()));
    }
    if ACCOUNT_SHAPE.is_match(input) {
        return Ok(Identifier::AccountName(input.to_string()));
    }
    if EMAIL_SHAPE.is_match(input) {
        return Ok(Identifier::Email(input.to_string()));
    }

    Err(LookupError::classification(format!(
        "'{input}' matches no identifier shape"
    )))
}

/// Classify a batch of input lines, requiring a homogeneous kind.
///
/// Blank lines are skipped and do not count toward homogeneity. Every
/// remaining line must classify to the same kind as the first one; a
/// mixed batch is rejected in full with no partial result.
pub fn classify_lines<S: AsRef<str>>(lines: &[S]) -> LookupResult<Vec<Identifier>> {
    let mut identifiers = Vec::new();
    let mut expected: Option<IdentifierKind> = None;

    for (index, line) in lines.iter().enumerate() {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }

        let id = classify(line)?;
        match expected {
            None => expected = Some(id.kind()),
            Some(kind) if kind != id.kind() => {
                return Err(LookupError::MixedBatch {
                    expected: kind.to_string(),
                    found: id.kind().to_string(),
                    line: index + 1,
                });
            }
            Some(_) => {}
        }
        identifiers.push(id);
    }

    Ok(identifiers)
}
