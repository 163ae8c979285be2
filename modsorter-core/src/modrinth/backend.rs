//! Metadata source trait - abstraction over the remote project lookup
//!
//! The enrichment pipeline only sees this trait, so lookups can be served by
//! the Modrinth HTTP client or by a fixed table in tests.

use async_trait::async_trait;

use crate::catalog::{CatalogEntry, CatalogRow, Compat};

/// Outcome of looking up one catalog row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    /// The service knows the project
    Found {
        title: String,
        url: String,
        client_side: Compat,
        server_side: Compat,
    },
    /// The row has no usable slug; no request was made
    Unresolved,
    /// The service reported the slug as unknown
    NotFound,
    /// Transport, status or decoding failure for this row only
    Failed { reason: String },
}

impl LookupResult {
    /// Fold the outcome into a catalog entry for `row`
    pub fn into_entry(self, row: &CatalogRow) -> CatalogEntry {
        match self {
            LookupResult::Found {
                title,
                url,
                client_side,
                server_side,
            } => CatalogEntry {
                filename: row.filename.clone(),
                slug: row.slug.clone(),
                title,
                url,
                client_side,
                server_side,
            },
            LookupResult::Unresolved | LookupResult::NotFound => {
                CatalogEntry::with_outcome(row, Compat::NotFound)
            }
            LookupResult::Failed { .. } => CatalogEntry::with_outcome(row, Compat::Error),
        }
    }
}

/// Trait for remote metadata providers
///
/// Implementations never fail: every problem is folded into a
/// `LookupResult` so one bad row cannot abort a batch.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Look up the project behind `slug` for the archive `filename`
    async fn lookup(&self, filename: &str, slug: &str) -> LookupResult;

    /// Source identifier for logging
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_found_carries_metadata() {
        let row = CatalogRow::new("sodium-0.5.8.jar", "sodium");
        let entry = LookupResult::Found {
            title: "Sodium".to_string(),
            url: "https://modrinth.com/mod/sodium".to_string(),
            client_side: Compat::Required,
            server_side: Compat::Unsupported,
        }
        .into_entry(&row);

        assert_eq!(entry.title, "Sodium");
        assert_eq!(entry.client_side, Compat::Required);
        assert_eq!(entry.server_side, Compat::Unsupported);
        assert_eq!(entry.slug, "sodium");
    }

    #[test]
    fn test_unresolved_and_not_found_are_not_found() {
        let row = CatalogRow::new("a.jar", "");
        for result in [LookupResult::Unresolved, LookupResult::NotFound] {
            let entry = result.into_entry(&row);
            assert_eq!(entry.client_side, Compat::NotFound);
            assert_eq!(entry.server_side, Compat::NotFound);
            assert!(entry.title.is_empty());
            assert!(entry.url.is_empty());
        }
    }

    #[test]
    fn test_failed_is_error() {
        let row = CatalogRow::new("a.jar", "a");
        let entry = LookupResult::Failed {
            reason: "timed out".to_string(),
        }
        .into_entry(&row);
        assert_eq!(entry.client_side, Compat::Error);
        assert_eq!(entry.server_side, Compat::Error);
    }
}
