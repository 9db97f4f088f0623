//! LDAP server configuration
//!
//! Connection parameters for one directory server. Credentials are
//! redacted from `Debug` output via their own `Debug` impl.

use serde::{Deserialize, Serialize};

use dirlook_core::error::{LookupError, LookupResult};
use dirlook_core::request::{Credentials, DEFAULT_LDAP_PORT};

/// LDAPS port used when SSL is enabled and no port is pinned.
const DEFAULT_LDAPS_PORT: u16 = 636;

/// Configuration for one LDAP server connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LdapServerConfig {
    /// Server hostname or IP address.
    pub host: String,

    /// Explicit port. `None` falls back to 389 (or 636 under SSL).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Use SSL/TLS (LDAPS).
    #[serde(default)]
    pub use_ssl: bool,

    /// Bind credentials; anonymous bind when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,

    /// Page size for search operations. Generous so result sets below
    /// it are never silently truncated.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_page_size() -> u32 {
    1000
}

fn default_connect_timeout_secs() -> u64 {
    30
}

impl LdapServerConfig {
    /// Create a config for a host with defaults.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            use_ssl: false,
            credentials: None,
            page_size: default_page_size(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }

    /// Pin an explicit port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Enable SSL (LDAPS).
    #[must_use]
    pub fn with_ssl(mut self) -> Self {
        self.use_ssl = true;
        self
    }

    /// Set bind credentials.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// The port this config actually connects to.
    #[must_use]
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(if self.use_ssl {
            DEFAULT_LDAPS_PORT
        } else {
            DEFAULT_LDAP_PORT
        })
    }

    /// The LDAP URL.
    #[must_use]
    pub fn url(&self) -> String {
        let scheme = if self.use_ssl { "ldaps" } else { "ldap" };
        format!("{}://{}:{}", scheme, self.host, self.effective_port())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> LookupResult<()> {
        if self.host.is_empty() {
            return Err(LookupError::invalid_request("server host is required"));
        }
        if self.page_size == 0 {
            return Err(LookupError::invalid_request("page_size must be positive"));
        }
        Ok(())
    }
}
