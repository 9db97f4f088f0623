//! Directory service capability traits
//!
//! The directory is a capability (search-by-filter-and-projection), not
//! a concrete transport: the resolver and orchestrator are generic over
//! these traits so protocol implementations are swappable and a scripted
//! fake can stand in during tests.

use async_trait::async_trait;

use crate::entry::DirectoryEntry;
use crate::error::LookupResult;
use crate::request::{Credentials, Protocol, ServerTarget};

/// Capability for executing one search against a directory server.
///
/// A session is scoped to one server/protocol/credential combination,
/// but each `search` call performs its own connect/search/release round
/// trip — connections are never held across calls, so repeated
/// resolution stages each open and close their own.
#[async_trait]
pub trait DirectorySearch: Send + Sync {
    /// Execute a filter against a search root.
    ///
    /// # Arguments
    /// * `base` - search root DN; `None` means the server's default root
    /// * `filter` - filter expression to execute
    /// * `attributes` - optional projection; `None` requests the
    ///   service's full default attribute set
    ///
    /// # Returns
    /// Decoded entries in the order the service returned them. Every
    /// value has passed through the attribute codec and the
    /// entry-locator attribute is excluded.
    async fn search(
        &self,
        base: Option<&str>,
        filter: &str,
        attributes: Option<&[String]>,
    ) -> LookupResult<Vec<DirectoryEntry>>;
}

// A shared session searches like the session itself; connectors may
// hand out the same underlying session behind an Arc.
#[async_trait]
impl<S: DirectorySearch> DirectorySearch for std::sync::Arc<S> {
    async fn search(
        &self,
        base: Option<&str>,
        filter: &str,
        attributes: Option<&[String]>,
    ) -> LookupResult<Vec<DirectoryEntry>> {
        self.as_ref().search(base, filter, attributes).await
    }
}

/// Capability for opening search sessions against directory servers.
///
/// The orchestrator goes through this seam so tests can observe which
/// server, port, and protocol a query selected.
pub trait DirectoryConnector: Send + Sync {
    /// The session type this connector produces.
    type Session: DirectorySearch;

    /// Open a session scoped to a server and protocol variant.
    fn open(
        &self,
        server: &ServerTarget,
        protocol: Protocol,
        credentials: Option<&Credentials>,
    ) -> LookupResult<Self::Session>;
}

impl<C: DirectoryConnector> DirectoryConnector for &C {
    type Session = C::Session;

    fn open(
        &self,
        server: &ServerTarget,
        protocol: Protocol,
        credentials: Option<&Credentials>,
    ) -> LookupResult<Self::Session> {
        (*self).open(server, protocol, credentials)
    }
}
