//! Query requests
//!
//! The immutable request the excluded CLI layer hands to the
//! orchestrator: server target, optional credentials, the lookup target,
//! and an optional attribute projection.

use serde::{Deserialize, Serialize};

use crate::identifier::Identifier;

/// Standard LDAP port.
pub const DEFAULT_LDAP_PORT: u16 = 389;

/// Global catalog port: forest-wide lookups for SIDs and email
/// addresses, which are not scoped to a single domain.
pub const GLOBAL_CATALOG_PORT: u16 = 3268;

/// The protocol variant a query runs under, derived from the port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protocol {
    /// Standard domain-scoped directory access.
    Standard,
    /// Forest-wide global catalog access.
    GlobalCatalog,
}

impl Protocol {
    /// Derive the protocol from a port: 3268 selects the global catalog,
    /// anything else (or none) the standard variant.
    pub fn from_port(port: Option<u16>) -> Self {
        if port == Some(GLOBAL_CATALOG_PORT) {
            Protocol::GlobalCatalog
        } else {
            Protocol::Standard
        }
    }
}

/// The directory server to query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerTarget {
    /// Server hostname or IP address.
    pub host: String,

    /// Explicit port. `None` leaves port selection to the orchestrator
    /// (global catalog auto-selection) and the transport default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl ServerTarget {
    /// Create a target with no pinned port.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
        }
    }

    /// Pin an explicit port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }
}

/// Bind credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Bind user name.
    pub username: String,
    /// Bind secret.
    pub secret: String,
}

impl Credentials {
    /// Create a credential pair.
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("secret", &"***REDACTED***")
            .finish()
    }
}

/// What the query resolves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryTarget {
    /// A caller-supplied raw filter expression, used as-is.
    Filter(String),
    /// An explicit distinguished name, resolved through the fallback chain.
    Dn(String),
    /// A batch of distinguished names, resolved independently in order.
    DnBatch(Vec<String>),
    /// A single classified identifier.
    Identifier(Identifier),
    /// A homogeneous batch of classified identifiers, resolved in one
    /// OR-group round trip.
    Identifiers(Vec<Identifier>),
}

/// One immutable lookup request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The server to query.
    pub server: ServerTarget,

    /// Optional bind credentials; anonymous bind when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,

    /// What to resolve.
    pub target: QueryTarget,

    /// Optional ordered attribute projection. When absent the service's
    /// full default attribute set is requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<String>>,
}

impl QueryRequest {
    /// Create a request against a server.
    pub fn new(server: ServerTarget, target: QueryTarget) -> Self {
        Self {
            server,
            credentials: None,
            target,
            attributes: None,
        }
    }

    /// Attach bind credentials.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Restrict the attributes requested from the service.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Vec<String>) -> Self {
        self.attributes = Some(attributes);
        self
    }
}
