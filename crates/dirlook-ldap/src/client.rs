//! LDAP directory client
//!
//! Implements the directory-search capability over `ldap3`. Each search
//! call is a complete scoped round trip: connect, bind, search through
//! the paged-results control, unbind — on every exit path, including the
//! failing ones. Every returned value passes through the attribute codec
//! before it reaches the entry map, and the transport's entry-locator
//! attribute never does.

use async_trait::async_trait;
use ldap3::adapters::{Adapter, EntriesOnly, PagedResults};
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, Scope, SearchEntry};
use tracing::{debug, info, instrument, warn};

use dirlook_core::codec::{self, RawValue};
use dirlook_core::entry::DirectoryEntry;
use dirlook_core::error::{LookupError, LookupResult};
use dirlook_core::request::{Credentials, Protocol, ServerTarget};
use dirlook_core::traits::{DirectoryConnector, DirectorySearch};

use crate::config::LdapServerConfig;

/// LDAP result code for a rejected bind (invalidCredentials).
const RC_INVALID_CREDENTIALS: u32 = 49;

/// A search session against one LDAP server.
///
/// Holds configuration only — no live connection. Each search opens and
/// releases its own.
#[derive(Debug, Clone)]
pub struct LdapDirectoryClient {
    config: LdapServerConfig,
    protocol: Protocol,
}

impl LdapDirectoryClient {
    /// Create a client for a validated configuration.
    pub fn new(config: LdapServerConfig, protocol: Protocol) -> LookupResult<Self> {
        config.validate()?;
        Ok(Self { config, protocol })
    }

    /// Connect and bind, returning a live handle.
    async fn connect(&self) -> LookupResult<Ldap> {
        let url = self.config.url();
        debug!(url = %url, "connecting to directory server");

        let settings = LdapConnSettings::new()
            .set_conn_timeout(std::time::Duration::from_secs(self.config.connect_timeout_secs));

        let (conn, mut ldap) = LdapConnAsync::with_settings(settings, &url)
            .await
            .map_err(|e| {
                LookupError::connection_failed_with_source(
                    &self.config.host,
                    format!("failed to connect to {url}"),
                    e,
                )
            })?;

        // Drive the connection; ends when the handle is unbound/dropped.
        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!(error = %e, "LDAP connection driver error");
            }
        });

        let (bind_dn, bind_password) = match &self.config.credentials {
            Some(creds) => (creds.username.as_str(), creds.secret.as_str()),
            None => ("", ""),
        };

        let result = ldap.simple_bind(bind_dn, bind_password).await.map_err(|e| {
            LookupError::connection_failed_with_source(&self.config.host, "LDAP bind failed", e)
        })?;

        if result.rc == RC_INVALID_CREDENTIALS {
            return Err(LookupError::AuthenticationFailed {
                server: self.config.host.clone(),
            });
        }
        if result.rc != 0 {
            return Err(LookupError::connection_failed(
                &self.config.host,
                format!("LDAP bind failed with code {}: {}", result.rc, result.text),
            ));
        }

        Ok(ldap)
    }

    /// Resolve the default search root from the rootDSE.
    ///
    /// The standard protocol scopes to the server's own domain
    /// (`defaultNamingContext`); the global catalog scopes to the forest
    /// root (`rootDomainNamingContext`). Each falls back to the other
    /// when the server does not advertise it.
    async fn default_root(&self, ldap: &mut Ldap) -> LookupResult<String> {
        let (entries, _) = ldap
            .search(
                "",
                Scope::Base,
                "(objectClass=*)",
                vec!["defaultNamingContext", "rootDomainNamingContext"],
            )
            .await
            .map_err(|e| LookupError::search_failed_with_source("rootDSE read failed", e))?
            .success()
            .map_err(|e| LookupError::search_failed_with_source("rootDSE read failed", e))?;

        let root_dse = entries
            .into_iter()
            .next()
            .map(SearchEntry::construct)
            .ok_or_else(|| LookupError::search_failed("server returned no rootDSE entry"))?;

        let pick = |name: &str| -> Option<String> {
            root_dse.attrs.get(name).and_then(|v| v.first().cloned())
        };
        let root = match self.protocol {
            Protocol::Standard => {
                pick("defaultNamingContext").or_else(|| pick("rootDomainNamingContext"))
            }
            Protocol::GlobalCatalog => {
                pick("rootDomainNamingContext").or_else(|| pick("defaultNamingContext"))
            }
        };

        root.ok_or_else(|| {
            LookupError::search_failed("server does not advertise a default naming context")
        })
    }

    /// Run one paged subtree search on a live handle.
    async fn run_search(
        &self,
        ldap: &mut Ldap,
        base: &str,
        filter: &str,
        attributes: Option<&[String]>,
    ) -> LookupResult<Vec<SearchEntry>> {
        let attrs: Vec<&str> = match attributes {
            Some(list) => list.iter().map(String::as_str).collect(),
            None => vec!["*"],
        };

        debug!(base = %base, filter = %filter, "searching directory");

        let adapters: Vec<Box<dyn Adapter<_, _>>> = vec![
            Box::new(EntriesOnly::new()),
            Box::new(PagedResults::new(self.config.page_size as i32)),
        ];

        let mut stream = ldap
            .streaming_search_with(adapters, base, Scope::Subtree, filter, attrs)
            .await
            .map_err(|e| LookupError::search_failed_with_source("LDAP search failed", e))?;

        let mut entries = Vec::new();
        while let Some(entry) = stream
            .next()
            .await
            .map_err(|e| LookupError::search_failed_with_source("LDAP search failed", e))?
        {
            entries.push(SearchEntry::construct(entry));
        }

        stream
            .finish()
            .await
            .success()
            .map_err(|e| LookupError::search_failed_with_source("LDAP search failed", e))?;

        Ok(entries)
    }

    /// Convert a raw search entry into a decoded directory entry.
    ///
    /// The transport DN and the legacy `adspath` locator are metadata,
    /// not directory data; neither enters the map.
    fn to_directory_entry(entry: SearchEntry) -> DirectoryEntry {
        let mut decoded = DirectoryEntry::new();

        for (name, values) in entry.attrs {
            if is_entry_locator(&name) {
                continue;
            }
            let raw: Vec<RawValue> = values.into_iter().map(RawValue::Text).collect();
            if let Some(value) = codec::decode_values(&name, &raw) {
                decoded.set(name, value);
            }
        }

        for (name, values) in entry.bin_attrs {
            if is_entry_locator(&name) {
                continue;
            }
            let raw: Vec<RawValue> = values.into_iter().map(RawValue::Binary).collect();
            if let Some(value) = codec::decode_values(&name, &raw) {
                decoded.set(name, value);
            }
        }

        decoded
    }
}

fn is_entry_locator(name: &str) -> bool {
    name.eq_ignore_ascii_case("adspath")
}

#[async_trait]
impl DirectorySearch for LdapDirectoryClient {
    #[instrument(skip(self, attributes), fields(host = %self.config.host))]
    async fn search(
        &self,
        base: Option<&str>,
        filter: &str,
        attributes: Option<&[String]>,
    ) -> LookupResult<Vec<DirectoryEntry>> {
        let mut ldap = self.connect().await?;

        let outcome = async {
            let root = match base {
                Some(explicit) => explicit.to_string(),
                None => self.default_root(&mut ldap).await?,
            };
            self.run_search(&mut ldap, &root, filter, attributes).await
        }
        .await;

        // Release the session on every path.
        if let Err(e) = ldap.unbind().await {
            warn!(error = %e, "error during LDAP unbind");
        }

        let entries = outcome?;
        info!(count = entries.len(), "search completed");

        Ok(entries
            .into_iter()
            .map(Self::to_directory_entry)
            .collect())
    }
}

/// Connector producing per-query LDAP sessions.
#[derive(Debug, Clone)]
pub struct LdapDirectory {
    /// Use SSL/TLS (LDAPS) for connections.
    pub use_ssl: bool,
    /// Page size for search operations.
    pub page_size: u32,
    /// Connection timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for LdapDirectory {
    fn default() -> Self {
        Self {
            use_ssl: false,
            page_size: 1000,
            connect_timeout_secs: 30,
        }
    }
}

impl DirectoryConnector for LdapDirectory {
    type Session = LdapDirectoryClient;

    fn open(
        &self,
        server: &ServerTarget,
        protocol: Protocol,
        credentials: Option<&Credentials>,
    ) -> LookupResult<Self::Session> {
        let mut config = LdapServerConfig::new(&server.host);
        config.port = server.port;
        config.use_ssl = self.use_ssl;
        config.page_size = self.page_size;
        config.connect_timeout_secs = self.connect_timeout_secs;
        config.credentials = credentials.cloned();

        LdapDirectoryClient::new(config, protocol)
    }
}
