//! Enrichment coordinator
//!
//! Fans one lookup per catalog row out onto the tokio runtime and joins them
//! back in row order. A row whose lookup fails is degraded to
//! `Compat::Error`; the batch itself only fails if a lookup task dies.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::catalog::{is_unresolved_slug, CatalogEntry, CatalogRow, Compat};
use crate::config::LookupConfig;
use crate::error::EnrichError;
use crate::modrinth::{LookupResult, MetadataSource, ModrinthClient};

/// Runs lookups for a whole catalog
#[derive(Clone)]
pub struct Enricher {
    source: Arc<dyn MetadataSource>,
    concurrency: Option<usize>,
}

impl Enricher {
    /// Unbounded fan-out over `source`
    pub fn new(source: Arc<dyn MetadataSource>) -> Self {
        Self {
            source,
            concurrency: None,
        }
    }

    /// Enricher backed by the Modrinth client
    pub fn from_config(config: &LookupConfig) -> anyhow::Result<Self> {
        let client = ModrinthClient::new(config)?;
        Ok(Self::new(Arc::new(client)).with_concurrency(config.concurrency))
    }

    /// Cap the number of lookups in flight (`None` = all at once)
    pub fn with_concurrency(mut self, limit: Option<usize>) -> Self {
        self.concurrency = limit.map(|n| n.max(1));
        self
    }

    /// Enrich raw catalog records (header already stripped)
    pub async fn enrich_records(
        &self,
        records: &[Vec<String>],
    ) -> Result<Vec<CatalogEntry>, EnrichError> {
        let rows: Vec<CatalogRow> = records
            .iter()
            .map(|r| CatalogRow::from_fields(r.as_slice()))
            .collect();
        self.enrich(&rows).await
    }

    /// Look up every row concurrently and return entries in input order
    ///
    /// Rows with an empty or sentinel slug never reach the source.
    pub async fn enrich(&self, rows: &[CatalogRow]) -> Result<Vec<CatalogEntry>, EnrichError> {
        use futures::future::join_all;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        info!(
            "Enriching {} catalog rows via {} (concurrency: {})",
            rows.len(),
            self.source.name(),
            self.concurrency
                .map(|n| n.to_string())
                .unwrap_or_else(|| "unbounded".to_string())
        );

        let limiter = self.concurrency.map(|n| Arc::new(Semaphore::new(n)));

        let handles: Vec<_> = rows
            .iter()
            .map(|row| {
                let source = Arc::clone(&self.source);
                let limiter = limiter.clone();
                let filename = row.filename.clone();
                let slug = row.slug.clone();
                tokio::spawn(async move {
                    if is_unresolved_slug(&slug) {
                        return LookupResult::Unresolved;
                    }
                    // Held until the lookup finishes
                    let _permit = match limiter {
                        Some(semaphore) => semaphore.acquire_owned().await.ok(),
                        None => None,
                    };
                    source.lookup(&filename, &slug).await
                })
            })
            .collect();

        let results = join_all(handles).await;

        let mut entries = Vec::with_capacity(rows.len());
        for (index, (row, joined)) in rows.iter().zip(results).enumerate() {
            let result = joined.map_err(|source| EnrichError::TaskFailed {
                index,
                filename: row.filename.clone(),
                source,
            })?;
            debug!("[{}] lookup result: {:?}", row.filename, result);
            entries.push(result.into_entry(row));
        }

        let count = |c: Compat| {
            entries
                .iter()
                .filter(|e| e.client_side == c && e.server_side == c)
                .count()
        };
        info!(
            "Enriched {} rows ({} not found, {} failed)",
            entries.len(),
            count(Compat::NotFound),
            count(Compat::Error)
        );

        Ok(entries)
    }
}
