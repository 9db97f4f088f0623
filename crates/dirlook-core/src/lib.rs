//! # dirlook core
//!
//! Protocol-free core of the dirlook directory-lookup client.
//!
//! Given a loosely-typed identifier (account name, distinguished name,
//! security identifier, or email address), this crate classifies the
//! input, synthesizes the matching LDAP filter expression, and decodes
//! protocol-native value encodings (binary SIDs, binary GUIDs, FILETIME
//! timestamps) into human-readable strings.
//!
//! The directory service itself is a capability: implementations of
//! [`DirectorySearch`] execute a filter against a server and return
//! decoded [`DirectoryEntry`] maps. The LDAP transport lives in the
//! `dirlook-ldap` crate; anything implementing the trait (including a
//! scripted fake in tests) can stand in for it.
//!
//! ## Example
//!
//! ```
//! use dirlook_core::prelude::*;
//!
//! let id = classify("S-1-5-21-1-2-3-1001").unwrap();
//! assert_eq!(id.kind(), IdentifierKind::SecurityId);
//!
//! let term = filter::for_identifier(&id);
//! assert!(term.starts_with("(objectSid="));
//! ```
//!
//! ## Crate organization
//!
//! - [`identifier`] - classification of raw input into identifier variants
//! - [`filter`] - LDAP filter synthesis with RFC 4515 escaping
//! - [`codec`] - decoding of binary/numeric attribute values
//! - [`sid`] - canonical binary SID encoding and rendering
//! - [`entry`] - decoded directory entries and attribute values
//! - [`request`] - query requests, server targets, protocol selection
//! - [`error`] - error taxonomy with connectivity classification
//! - [`traits`] - directory service capability traits

pub mod codec;
pub mod entry;
pub mod error;
pub mod filter;
pub mod identifier;
pub mod request;
pub mod sid;
pub mod traits;

/// Prelude module for convenient imports.
///
/// ```
/// use dirlook_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::codec::{decode, decode_values, RawValue};
    pub use crate::entry::{AttributeValue, DirectoryEntry, ResultSet};
    pub use crate::error::{LookupError, LookupResult};
    pub use crate::filter;
    pub use crate::identifier::{classify, classify_lines, Identifier, IdentifierKind};
    pub use crate::request::{
        Credentials, Protocol, QueryRequest, QueryTarget, ServerTarget, DEFAULT_LDAP_PORT,
        GLOBAL_CATALOG_PORT,
    };
    pub use crate::traits::{DirectoryConnector, DirectorySearch};
}

pub use entry::{AttributeValue, DirectoryEntry, ResultSet};
pub use error::{LookupError, LookupResult};
pub use identifier::{classify, classify_lines, Identifier, IdentifierKind};
pub use request::{Credentials, Protocol, QueryRequest, QueryTarget, ServerTarget};
pub use traits::{DirectoryConnector, DirectorySearch};

// Re-export async_trait for trait implementors
pub use async_trait::async_trait;
