//! Query orchestration
//!
//! Turns one [`QueryRequest`] into directory traffic: picks the port
//! (auto-selecting the global catalog for forest-wide targets), opens a
//! session, synthesizes the filter or drives the DN resolution ladder,
//! and collects entries plus per-item diagnostics for batches.

use tracing::{debug, info, instrument};

use dirlook_core::entry::ResultSet;
use dirlook_core::error::{LookupError, LookupResult};
use dirlook_core::filter;
use dirlook_core::identifier::{Identifier, IdentifierKind};
use dirlook_core::request::{
    Protocol, QueryRequest, QueryTarget, ServerTarget, GLOBAL_CATALOG_PORT,
};
use dirlook_core::traits::{DirectoryConnector, DirectorySearch};

use crate::resolver::DnResolver;

/// The result of one executed request.
#[derive(Debug, Clone, Default)]
pub struct LookupOutcome {
    /// All matched entries, in batch order for batch targets.
    pub entries: ResultSet,
    /// Human-readable notes about batch items that matched nothing or
    /// failed to resolve. Empty for single-target requests.
    pub diagnostics: Vec<String>,
}

/// Drives lookup requests against a directory connector.
pub struct QueryOrchestrator<C: DirectoryConnector> {
    connector: C,
}

impl<C: DirectoryConnector> QueryOrchestrator<C> {
    /// Create an orchestrator over a connector.
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    /// Execute one request end to end.
    #[instrument(skip(self, request), fields(host = %request.server.host))]
    pub async fn execute(&self, request: &QueryRequest) -> LookupResult<LookupOutcome> {
        validate_target(&request.target)?;

        let port = effective_port(request);
        let protocol = Protocol::from_port(port);
        if request.server.port.is_none() && port.is_some() {
            debug!(port = GLOBAL_CATALOG_PORT, "auto-selected global catalog");
        }

        let server = ServerTarget {
            host: request.server.host.clone(),
            port,
        };
        let session = self
            .connector
            .open(&server, protocol, request.credentials.as_ref())?;
        let attributes = request.attributes.as_deref();

        let outcome = match &request.target {
            QueryTarget::Filter(expression) => {
                let entries = session.search(None, expression, attributes).await?;
                LookupOutcome {
                    entries,
                    diagnostics: Vec::new(),
                }
            }
            QueryTarget::Dn(dn) => {
                let resolution = DnResolver::new(&session).resolve(dn, attributes).await?;
                LookupOutcome {
                    entries: resolution.entries,
                    diagnostics: Vec::new(),
                }
            }
            QueryTarget::DnBatch(dns) => resolve_dn_batch(&session, dns, attributes).await,
            QueryTarget::Identifier(Identifier::DistinguishedName(dn)) => {
                let resolution = DnResolver::new(&session).resolve(dn, attributes).await?;
                LookupOutcome {
                    entries: resolution.entries,
                    diagnostics: Vec::new(),
                }
            }
            QueryTarget::Identifier(identifier) => {
                let expression = filter::for_identifier(identifier);
                let entries = session.search(None, &expression, attributes).await?;
                LookupOutcome {
                    entries,
                    diagnostics: Vec::new(),
                }
            }
            QueryTarget::Identifiers(identifiers)
                if identifiers
                    .iter()
                    .all(|i| i.kind() == IdentifierKind::DistinguishedName) =>
            {
                let dns: Vec<String> =
                    identifiers.iter().map(|i| i.value().to_string()).collect();
                resolve_dn_batch(&session, &dns, attributes).await
            }
            QueryTarget::Identifiers(identifiers) => {
                let terms: Vec<String> =
                    identifiers.iter().map(filter::for_identifier).collect();
                let expression = filter::any_of(&terms);
                let entries = session.search(None, &expression, attributes).await?;
                LookupOutcome {
                    entries,
                    diagnostics: Vec::new(),
                }
            }
        };

        info!(
            count = outcome.entries.len(),
            diagnostics = outcome.diagnostics.len(),
            "lookup completed"
        );
        Ok(outcome)
    }
}

/// Resolve each DN independently, in order, collecting diagnostics for
/// items that matched nothing or failed every resolution stage.
async fn resolve_dn_batch<S: DirectorySearch>(
    session: &S,
    dns: &[String],
    attributes: Option<&[String]>,
) -> LookupOutcome {
    let resolver = DnResolver::new(session);
    let mut outcome = LookupOutcome::default();

    for dn in dns {
        match resolver.resolve(dn, attributes).await {
            Ok(resolution) if resolution.entries.is_empty() => {
                outcome.diagnostics.push(format!("no results for DN: {dn}"));
            }
            Ok(resolution) => outcome.entries.extend(resolution.entries),
            Err(e) => {
                outcome
                    .diagnostics
                    .push(format!("failed to resolve DN {dn}: {e}"));
            }
        }
    }

    outcome
}

/// The port the query should run on: a pinned port always wins, and a
/// forest-wide target with no pinned port selects the global catalog.
fn effective_port(request: &QueryRequest) -> Option<u16> {
    if request.server.port.is_some() {
        return request.server.port;
    }
    if is_forest_wide(&request.target) {
        Some(GLOBAL_CATALOG_PORT)
    } else {
        None
    }
}

/// SIDs and email addresses are not scoped to one domain, so they
/// resolve against the whole forest.
fn is_forest_wide(target: &QueryTarget) -> bool {
    let forest_kind = |identifier: &Identifier| {
        matches!(
            identifier.kind(),
            IdentifierKind::SecurityId | IdentifierKind::Email
        )
    };
    match target {
        QueryTarget::Identifier(identifier) => forest_kind(identifier),
        QueryTarget::Identifiers(identifiers) => {
            !identifiers.is_empty() && identifiers.iter().all(forest_kind)
        }
        _ => false,
    }
}

fn validate_target(target: &QueryTarget) -> LookupResult<()> {
    match target {
        QueryTarget::DnBatch(dns) if dns.is_empty() => {
            Err(LookupError::invalid_request("DN batch is empty"))
        }
        QueryTarget::Identifiers(identifiers) if identifiers.is_empty() => {
            Err(LookupError::invalid_request("identifier batch is empty"))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedConnector;
    use dirlook_core::entry::DirectoryEntry;
    use dirlook_core::identifier::classify;
    use dirlook_core::request::Credentials;

    fn entry_with_dn(dn: &str) -> DirectoryEntry {
        DirectoryEntry::new().with("distinguishedName", dn)
    }

    fn request(target: QueryTarget) -> QueryRequest {
        QueryRequest::new(ServerTarget::new("dc01.example.com"), target)
    }

    #[tokio::test]
    async fn test_raw_filter_passes_through_untouched() {
        let connector = ScriptedConnector::new(vec![Ok(vec![entry_with_dn("CN=x")])]);
        let target = QueryTarget::Filter("(&(objectClass=user)(cn=J*))".to_string());

        let outcome = QueryOrchestrator::new(&connector)
            .execute(&request(target))
            .await
            .unwrap();

        assert_eq!(outcome.entries.len(), 1);
        assert!(outcome.diagnostics.is_empty());
        assert_eq!(
            connector.searches()[0].filter,
            "(&(objectClass=user)(cn=J*))"
        );
    }

    #[tokio::test]
    async fn test_sid_lookup_auto_selects_global_catalog() {
        let connector = ScriptedConnector::new(vec![Ok(vec![entry_with_dn("CN=x")])]);
        let identifier = classify("S-1-5-21-1-2-3-1001").unwrap();
        assert_eq!(identifier.kind(), IdentifierKind::SecurityId);

        QueryOrchestrator::new(&connector)
            .execute(&request(QueryTarget::Identifier(identifier)))
            .await
            .unwrap();

        let opens = connector.opens();
        assert_eq!(opens[0].port, Some(3268));
        assert_eq!(opens[0].protocol, Protocol::GlobalCatalog);
        // The filter carries the binary SID encoding, not the text form.
        let filter = &connector.searches()[0].filter;
        assert!(filter.starts_with("(objectSid=\\01\\05"));
    }

    #[tokio::test]
    async fn test_email_lookup_auto_selects_global_catalog() {
        let connector = ScriptedConnector::new(vec![Ok(vec![])]);
        let identifier = classify("j.smith@example.com").unwrap();

        QueryOrchestrator::new(&connector)
            .execute(&request(QueryTarget::Identifier(identifier)))
            .await
            .unwrap();

        assert_eq!(connector.opens()[0].port, Some(3268));
        assert_eq!(
            connector.searches()[0].filter,
            "(mail=j.smith@example.com)"
        );
    }

    #[tokio::test]
    async fn test_pinned_port_wins_over_auto_selection() {
        let connector = ScriptedConnector::new(vec![Ok(vec![])]);
        let identifier = classify("S-1-5-21-1-2-3-1001").unwrap();
        let req = QueryRequest::new(
            ServerTarget::new("dc01.example.com").with_port(636),
            QueryTarget::Identifier(identifier),
        );

        QueryOrchestrator::new(&connector).execute(&req).await.unwrap();

        assert_eq!(connector.opens()[0].port, Some(636));
        assert_eq!(connector.opens()[0].protocol, Protocol::Standard);
    }

    #[tokio::test]
    async fn test_account_name_stays_on_standard_protocol() {
        let connector = ScriptedConnector::new(vec![Ok(vec![])]);
        let identifier = classify("jsmith").unwrap();

        QueryOrchestrator::new(&connector)
            .execute(&request(QueryTarget::Identifier(identifier)))
            .await
            .unwrap();

        assert_eq!(connector.opens()[0].port, None);
        assert_eq!(connector.opens()[0].protocol, Protocol::Standard);
        assert_eq!(connector.searches()[0].filter, "(sAMAccountName=jsmith)");
    }

    #[tokio::test]
    async fn test_dn_target_runs_the_resolution_ladder() {
        let dn = "CN=J Smith,DC=example,DC=com";
        let connector = ScriptedConnector::new(vec![Ok(vec![entry_with_dn(dn)])]);

        let outcome = QueryOrchestrator::new(&connector)
            .execute(&request(QueryTarget::Dn(dn.to_string())))
            .await
            .unwrap();

        assert_eq!(outcome.entries.len(), 1);
        assert_eq!(
            connector.searches()[0].base.as_deref(),
            Some("DC=example,DC=com")
        );
        // A DN never auto-selects the global catalog.
        assert_eq!(connector.opens()[0].port, None);
    }

    #[tokio::test]
    async fn test_dn_batch_collects_diagnostics_per_item() {
        let found = "CN=Found,DC=example,DC=com";
        let missing = "CN=Missing,DC=example,DC=com";
        let broken = "CN=Broken,DC=example,DC=com";
        let connector = ScriptedConnector::new(vec![
            // found: direct attempt succeeds.
            Ok(vec![entry_with_dn(found)]),
            // missing: all stages come back empty.
            Err(LookupError::search_failed("no such object")),
            Err(LookupError::search_failed("no such object")),
            Ok(vec![]),
            // broken: every stage fails.
            Err(LookupError::search_failed("no such object")),
            Err(LookupError::search_failed("no such object")),
            Err(LookupError::search_failed("server unavailable")),
        ]);
        let dns = vec![found.to_string(), missing.to_string(), broken.to_string()];

        let outcome = QueryOrchestrator::new(&connector)
            .execute(&request(QueryTarget::DnBatch(dns)))
            .await
            .unwrap();

        assert_eq!(outcome.entries.len(), 1);
        assert_eq!(outcome.diagnostics.len(), 2);
        assert!(outcome.diagnostics[0].contains(missing));
        assert!(outcome.diagnostics[1].contains(broken));
    }

    #[tokio::test]
    async fn test_identifier_batch_resolves_in_one_or_group() {
        let connector = ScriptedConnector::new(vec![Ok(vec![])]);
        let identifiers = vec![
            classify("jsmith").unwrap(),
            classify("mjones").unwrap(),
        ];

        QueryOrchestrator::new(&connector)
            .execute(&request(QueryTarget::Identifiers(identifiers)))
            .await
            .unwrap();

        let searches = connector.searches();
        assert_eq!(searches.len(), 1);
        assert_eq!(
            searches[0].filter,
            "(|(sAMAccountName=jsmith)(sAMAccountName=mjones))"
        );
    }

    #[tokio::test]
    async fn test_dn_identifier_batch_uses_the_ladder() {
        let dn1 = "CN=A,DC=example,DC=com";
        let dn2 = "CN=B,DC=example,DC=com";
        let connector = ScriptedConnector::new(vec![
            Ok(vec![entry_with_dn(dn1)]),
            Ok(vec![entry_with_dn(dn2)]),
        ]);
        let identifiers = vec![classify(dn1).unwrap(), classify(dn2).unwrap()];

        let outcome = QueryOrchestrator::new(&connector)
            .execute(&request(QueryTarget::Identifiers(identifiers)))
            .await
            .unwrap();

        assert_eq!(outcome.entries.len(), 2);
        // One direct-attempt search per DN, in order.
        assert_eq!(connector.searches().len(), 2);
    }

    #[tokio::test]
    async fn test_sid_batch_auto_selects_global_catalog() {
        let connector = ScriptedConnector::new(vec![Ok(vec![])]);
        let identifiers = vec![
            classify("S-1-5-21-1-2-3-1001").unwrap(),
            classify("S-1-5-21-1-2-3-1002").unwrap(),
        ];

        QueryOrchestrator::new(&connector)
            .execute(&request(QueryTarget::Identifiers(identifiers)))
            .await
            .unwrap();

        assert_eq!(connector.opens()[0].port, Some(3268));
    }

    #[tokio::test]
    async fn test_mixed_forest_batch_stays_on_standard_port() {
        let connector = ScriptedConnector::new(vec![Ok(vec![])]);
        let identifiers = vec![
            classify("jsmith").unwrap(),
            classify("j.smith@example.com").unwrap(),
        ];

        QueryOrchestrator::new(&connector)
            .execute(&request(QueryTarget::Identifiers(identifiers)))
            .await
            .unwrap();

        assert_eq!(connector.opens()[0].port, None);
    }

    #[tokio::test]
    async fn test_empty_batches_are_rejected() {
        let connector = ScriptedConnector::new(vec![]);
        let orchestrator = QueryOrchestrator::new(&connector);

        let err = orchestrator
            .execute(&request(QueryTarget::Identifiers(vec![])))
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::InvalidRequest { .. }));

        let err = orchestrator
            .execute(&request(QueryTarget::DnBatch(vec![])))
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::InvalidRequest { .. }));

        // Rejected before any connection is opened.
        assert!(connector.opens().is_empty());
    }

    #[tokio::test]
    async fn test_credentials_are_forwarded_to_the_connector() {
        let connector = ScriptedConnector::new(vec![Ok(vec![])]);
        let req = request(QueryTarget::Filter("(cn=x)".to_string()))
            .with_credentials(Credentials::new("CORP\\svc", "secret"));

        QueryOrchestrator::new(&connector).execute(&req).await.unwrap();

        assert!(connector.opens()[0].authenticated);
    }

    #[tokio::test]
    async fn test_attribute_projection_reaches_the_session() {
        let connector = ScriptedConnector::new(vec![Ok(vec![])]);
        let req = request(QueryTarget::Filter("(cn=x)".to_string()))
            .with_attributes(vec!["cn".to_string(), "mail".to_string()]);

        QueryOrchestrator::new(&connector).execute(&req).await.unwrap();

        assert_eq!(
            connector.searches()[0].attributes.as_deref(),
            Some(&["cn".to_string(), "mail".to_string()][..])
        );
    }
}
