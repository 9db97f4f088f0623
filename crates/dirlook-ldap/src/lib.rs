//! # dirlook LDAP transport
//!
//! LDAP implementation of the dirlook directory-service capability,
//! plus the DN resolution ladder and the query orchestrator that drives
//! a whole lookup request end to end.
//!
//! ## Connection model
//!
//! Every search call opens its own connection, binds, searches through
//! the paged-results control, and unbinds — connections are never held
//! across calls. Queries run strictly sequentially: one blocking round
//! trip (or, for batch DN resolution, a small bounded sequence of round
//! trips) per request, with no concurrent fan-out.
//!
//! ## Example
//!
//! ```ignore
//! use dirlook_core::prelude::*;
//! use dirlook_ldap::{LdapDirectory, QueryOrchestrator};
//!
//! let request = QueryRequest::new(
//!     ServerTarget::new("dc01.corp.example.com"),
//!     QueryTarget::Identifier(classify("S-1-5-21-1-2-3-1001")?),
//! );
//!
//! // SID lookups auto-select the global catalog port.
//! let orchestrator = QueryOrchestrator::new(LdapDirectory::default());
//! let outcome = orchestrator.execute(&request).await?;
//! for entry in &outcome.entries {
//!     println!("{:?}", entry.get_str("sAMAccountName"));
//! }
//! ```

pub mod client;
pub mod config;
pub mod orchestrator;
pub mod resolver;

#[cfg(test)]
mod testing;

// Re-exports
pub use client::{LdapDirectory, LdapDirectoryClient};
pub use config::LdapServerConfig;
pub use orchestrator::{LookupOutcome, QueryOrchestrator};
pub use resolver::{DnResolver, Resolution, ResolutionStage};
