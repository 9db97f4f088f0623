//! Decoded directory entries
//!
//! A [`DirectoryEntry`] maps attribute names (case-preserved, as the
//! service returned them) to decoded values. Entries never contain the
//! transport's entry-locator attribute and never hold raw binary once
//! decoding has run.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A decoded attribute value: a single string or an ordered list.
///
/// Never an empty list — a collection with one value collapses to the
/// scalar form, and empty collections are dropped before construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// A single decoded value.
    Single(String),
    /// Multiple decoded values, in the order the service returned them.
    Multi(Vec<String>),
}

impl AttributeValue {
    /// The first (or only) value.
    pub fn first(&self) -> &str {
        match self {
            AttributeValue::Single(s) => s,
            AttributeValue::Multi(values) => values.first().map(String::as_str).unwrap_or(""),
        }
    }

    /// All values as string slices.
    pub fn as_strings(&self) -> Vec<&str> {
        match self {
            AttributeValue::Single(s) => vec![s.as_str()],
            AttributeValue::Multi(values) => values.iter().map(String::as_str).collect(),
        }
    }

    /// Check if this is multi-valued.
    pub fn is_multi_valued(&self) -> bool {
        matches!(self, AttributeValue::Multi(_))
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::Single(s)
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Single(s.to_string())
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(values: Vec<String>) -> Self {
        AttributeValue::Multi(values)
    }
}

/// One matched directory object: attribute name to decoded value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    #[serde(flatten)]
    attributes: HashMap<String, AttributeValue>,
}

impl DirectoryEntry {
    /// Create a new empty entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Set an attribute using builder pattern.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Get an attribute value by exact name.
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Get the first value of an attribute by exact name.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).map(AttributeValue::first)
    }

    /// Get an attribute value ignoring name case.
    ///
    /// Directory attribute names are case-insensitive; the map preserves
    /// the service's casing, so lookups that cannot assume it (e.g.
    /// `distinguishedName` matching during DN resolution) go through
    /// this accessor.
    pub fn get_ci(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    /// Check if an attribute exists (exact name).
    pub fn has(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// All attribute names, as returned by the service.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Check if the entry has no attributes.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Iterate over all attributes.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttributeValue)> {
        self.attributes.iter()
    }
}

impl FromIterator<(String, AttributeValue)> for DirectoryEntry {
    fn from_iter<T: IntoIterator<Item = (String, AttributeValue)>>(iter: T) -> Self {
        Self {
            attributes: iter.into_iter().collect(),
        }
    }
}

/// Ordered sequence of matched entries, immutable once built.
pub type ResultSet = Vec<DirectoryEntry>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_value_accessors() {
        let value = AttributeValue::from("jsmith");
        assert_eq!(value.first(), "jsmith");
        assert_eq!(value.as_strings(), vec!["jsmith"]);
        assert!(!value.is_multi_valued());
    }

    #[test]
    fn test_multi_value_preserves_order() {
        let value = AttributeValue::from(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(value.as_strings(), vec!["a", "b"]);
        assert_eq!(value.first(), "a");
        assert!(value.is_multi_valued());
    }

    #[test]
    fn test_entry_case_preserving() {
        let entry = DirectoryEntry::new().with("sAMAccountName", "jsmith");
        assert!(entry.has("sAMAccountName"));
        assert!(!entry.has("samaccountname"));
        assert_eq!(entry.get_str("sAMAccountName"), Some("jsmith"));
    }

    #[test]
    fn test_entry_case_insensitive_lookup() {
        let entry =
            DirectoryEntry::new().with("distinguishedName", "CN=J Smith,DC=example,DC=com");
        let value = entry.get_ci("DISTINGUISHEDNAME").unwrap();
        assert_eq!(value.first(), "CN=J Smith,DC=example,DC=com");
        assert!(entry.get_ci("missing").is_none());
    }

    #[test]
    fn test_entry_serialization() {
        let entry = DirectoryEntry::new()
            .with("cn", "J Smith")
            .with("memberOf", vec!["CN=A".to_string(), "CN=B".to_string()]);
        let json = serde_json::to_string(&entry).unwrap();
        let parsed: DirectoryEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.get_str("cn"), Some("J Smith"));
        assert_eq!(parsed.get("memberOf").unwrap().as_strings(), vec!["CN=A", "CN=B"]);
    }
}
