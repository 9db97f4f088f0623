//! Distinguished-name resolution
//!
//! A DN lookup walks an explicit three-stage ladder. The direct attempt
//! is cheapest and most precise when the DN is well-formed; the filter
//! fallback tolerates DNs whose literal path lookup fails (referral or
//! ACL quirks); the component fallback re-derives the object from its
//! most identifying RDN when the DN is stale or slightly malformed.
//! Each stage runs only when the previous one failed, and the stage
//! that produced the result stays inspectable on the outcome.

use tracing::{debug, instrument};

use dirlook_core::entry::DirectoryEntry;
use dirlook_core::error::LookupResult;
use dirlook_core::filter;
use dirlook_core::traits::DirectorySearch;

/// Which stage of the ladder produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStage {
    /// Subtree search under the root derived from the DN's `DC=` components.
    DirectAttempt,
    /// Equality search against the server's default root.
    FilterFallback,
    /// Per-component equality searches filtered to exact-DN matches.
    ComponentFallback,
}

/// Outcome of resolving one DN.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Matched entries; empty is a valid terminal outcome, not an error.
    pub entries: Vec<DirectoryEntry>,
    /// The stage that produced the entries.
    pub stage: ResolutionStage,
}

/// Resolves distinguished names through the fallback ladder.
pub struct DnResolver<'a, S: DirectorySearch> {
    session: &'a S,
}

impl<'a, S: DirectorySearch> DnResolver<'a, S> {
    /// Create a resolver over a search session.
    pub fn new(session: &'a S) -> Self {
        Self { session }
    }

    /// Resolve a DN, advancing a stage only when the previous one failed.
    #[instrument(skip(self, attributes))]
    pub async fn resolve(
        &self,
        dn: &str,
        attributes: Option<&[String]>,
    ) -> LookupResult<Resolution> {
        match self.direct_attempt(dn, attributes).await {
            Ok(entries) => {
                return Ok(Resolution {
                    entries,
                    stage: ResolutionStage::DirectAttempt,
                })
            }
            Err(e) => debug!(error = %e, "direct attempt failed, trying filter fallback"),
        }

        match self.filter_fallback(dn, attributes).await {
            Ok(entries) => {
                return Ok(Resolution {
                    entries,
                    stage: ResolutionStage::FilterFallback,
                })
            }
            Err(e) => debug!(error = %e, "filter fallback failed, trying component fallback"),
        }

        let entries = self.component_fallback(dn, attributes).await?;
        Ok(Resolution {
            entries,
            stage: ResolutionStage::ComponentFallback,
        })
    }

    /// Stage 1: exact-DN search scoped to the DN's own naming context.
    async fn direct_attempt(
        &self,
        dn: &str,
        attributes: Option<&[String]>,
    ) -> LookupResult<Vec<DirectoryEntry>> {
        let root = derive_search_root(dn);
        self.session
            .search(Some(&root), &filter::distinguished_name(dn), attributes)
            .await
    }

    /// Stage 2: the same equality filter against the default root.
    async fn filter_fallback(
        &self,
        dn: &str,
        attributes: Option<&[String]>,
    ) -> LookupResult<Vec<DirectoryEntry>> {
        self.session
            .search(None, &filter::distinguished_name(dn), attributes)
            .await
    }

    /// Stage 3: re-derive the object from its components.
    ///
    /// With a `CN` component, one `cn` equality search filtered to
    /// exact-DN matches decides the outcome. Without one, the remaining
    /// components (skipping `DC` and `OU`) are tried in parse order
    /// until one yields an exact-DN match; none matching is a valid
    /// empty result.
    async fn component_fallback(
        &self,
        dn: &str,
        attributes: Option<&[String]>,
    ) -> LookupResult<Vec<DirectoryEntry>> {
        let components = parse_components(dn);

        if let Some((_, cn_value)) = components.iter().find(|(key, _)| key == "cn") {
            let entries = self
                .session
                .search(None, &filter::equals("cn", cn_value), attributes)
                .await?;
            return Ok(keep_exact_dn_matches(entries, dn));
        }

        for (key, value) in &components {
            if key == "dc" || key == "ou" {
                continue;
            }
            let entries = self
                .session
                .search(None, &filter::equals(key, value), attributes)
                .await?;
            let matches = keep_exact_dn_matches(entries, dn);
            if !matches.is_empty() {
                return Ok(matches);
            }
        }

        Ok(Vec::new())
    }
}

/// Derive the search root from a DN's `DC=` components, in their
/// original order. A DN with no `DC=` component (e.g. a configuration
/// container path) is its own root.
fn derive_search_root(dn: &str) -> String {
    let dc_components: Vec<&str> = dn
        .split(',')
        .map(str::trim)
        .filter(|component| {
            component
                .split_once('=')
                .is_some_and(|(key, _)| key.trim().eq_ignore_ascii_case("dc"))
        })
        .collect();

    if dc_components.is_empty() {
        dn.to_string()
    } else {
        dc_components.join(",")
    }
}

/// Parse a DN into its first-occurrence key/value pairs.
///
/// Splits on `,`, then on the first `=`; keys are lowercased and later
/// duplicates of a key are discarded.
fn parse_components(dn: &str) -> Vec<(String, String)> {
    let mut components: Vec<(String, String)> = Vec::new();
    for part in dn.split(',') {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim().to_string();
        if key.is_empty() || value.is_empty() {
            continue;
        }
        if components.iter().any(|(existing, _)| *existing == key) {
            continue;
        }
        components.push((key, value));
    }
    components
}

/// Keep only entries whose distinguished name matches the input exactly
/// (case-insensitive).
fn keep_exact_dn_matches(entries: Vec<DirectoryEntry>, dn: &str) -> Vec<DirectoryEntry> {
    entries
        .into_iter()
        .filter(|entry| {
            entry
                .get_ci("distinguishedName")
                .map(|value| value.first().eq_ignore_ascii_case(dn))
                .unwrap_or(false)
        })
        .collect()
}
