//! Catalog and distribution commands

use anyhow::{Context, Result};
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};
use tracing::{info, warn};

use modsorter_core::catalog::{reconcile, scan_archives, CatalogStore};
use modsorter_core::{CatalogEntry, CatalogRow, Compat, Distributor, Enricher, SorterConfig};

fn open_store(config: &SorterConfig) -> CatalogStore {
    CatalogStore::new(config.catalog_path()).with_backup(config.catalog_backup_path())
}

/// Rows from the catalog file, or none if it does not exist yet
fn load_rows(store: &CatalogStore) -> Result<Vec<CatalogRow>> {
    if !store.exists() {
        warn!(
            "Catalog file not found: {}, starting empty",
            store.path().display()
        );
        return Ok(Vec::new());
    }
    Ok(store.read_rows()?)
}

async fn enrich_rows(config: &SorterConfig, rows: &[CatalogRow]) -> Result<Vec<CatalogEntry>> {
    let enricher = Enricher::from_config(&config.lookup)?;
    Ok(enricher.enrich(rows).await?)
}

fn count(entries: &[CatalogEntry], compat: Compat) -> usize {
    entries
        .iter()
        .filter(|e| e.client_side == compat || e.server_side == compat)
        .count()
}

fn print_summary(entries: &[CatalogEntry]) {
    println!(
        "{} mods: {} not found, {} failed lookups",
        entries.len(),
        count(entries, Compat::NotFound),
        count(entries, Compat::Error)
    );
}

pub async fn execute_reload(config: &SorterConfig) -> Result<()> {
    let store = open_store(config);
    let rows = load_rows(&store)?;

    let mods_dir = config.mods_dir();
    let archives = scan_archives(&mods_dir, &config.archive_extension)
        .with_context(|| format!("Failed to scan mods directory: {}", mods_dir.display()))?;
    let reconciliation = reconcile(&rows, &archives);

    let entries = enrich_rows(config, &reconciliation.rows).await?;

    if reconciliation.changed() {
        store.write(&entries)?;
        info!("Catalog updated: {}", store.path().display());
    }

    println!(
        "Reloaded catalog: {} updated, {} added",
        reconciliation.updated, reconciliation.added
    );
    print_summary(&entries);
    Ok(())
}

pub async fn execute_enrich(config: &SorterConfig) -> Result<()> {
    let store = open_store(config);
    let rows = store.read_rows()?;

    let entries = enrich_rows(config, &rows).await?;
    store.write(&entries)?;

    print_summary(&entries);
    Ok(())
}

pub async fn execute_prepare(config: &SorterConfig) -> Result<()> {
    let store = open_store(config);
    let rows = store.read_rows()?;
    let entries = enrich_rows(config, &rows).await?;

    let report = Distributor::from_config(config).distribute(&entries)?;

    for (side, prepare) in [
        ("server", &report.server_prepare),
        ("client", &report.client_prepare),
    ] {
        if prepare.clear_failures > 0 {
            warn!(
                "{} {} entries could not be removed during preparation",
                prepare.clear_failures, side
            );
        }
        if prepare.reserved_present && !prepare.reserved_preserved {
            warn!(
                "{} reserved directory '{}' was not restored",
                side, config.reserved_dir
            );
        }
    }

    println!(
        "Server: {} mods ({} copied)",
        report.server_allowed, report.server_copy.copied
    );
    println!(
        "Client: {} mods ({} copied)",
        report.client_allowed, report.client_copy.copied
    );
    Ok(())
}

/// Table row for catalog entries
#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "Filename")]
    filename: String,
    #[tabled(rename = "Slug")]
    slug: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Client")]
    client: String,
    #[tabled(rename = "Server")]
    server: String,
    #[tabled(rename = "Issue")]
    issue: String,
}

impl From<&CatalogEntry> for EntryRow {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            filename: entry.filename.clone(),
            slug: entry.slug.clone(),
            title: entry.title.clone(),
            client: entry.client_side.to_string(),
            server: entry.server_side.to_string(),
            issue: entry.issue().unwrap_or_default().to_string(),
        }
    }
}

fn render_table(entries: &[CatalogEntry]) -> String {
    let rows: Vec<EntryRow> = entries.iter().map(EntryRow::from).collect();
    Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string()
}

pub fn execute_list(config: &SorterConfig, json: bool) -> Result<()> {
    let store = open_store(config);
    let entries = store.read_entries()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("Catalog is empty.");
        println!("\nRun 'modsorter reload' to pick up archives from the mods directory.");
        return Ok(());
    }

    println!("{}", render_table(&entries));
    Ok(())
}

pub fn execute_save(config: &SorterConfig) -> Result<()> {
    let store = open_store(config);
    let entries = store.read_entries()?;
    store.write(&entries)?;

    println!(
        "Saved {} entries to {}",
        entries.len(),
        store.path().display()
    );
    Ok(())
}

pub fn execute_slug(config: &SorterConfig, filename: &str, slug: &str) -> Result<()> {
    let store = open_store(config);
    let entry = store.update_slug(filename, slug)?;

    if entry.slug.is_empty() {
        println!("Cleared slug of {}", entry.filename);
    } else {
        println!("Set slug of {} to {}", entry.filename, entry.slug);
    }
    println!("\nRun 'modsorter enrich' to refresh its Modrinth data.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_shows_compat_spelling() {
        let entry = CatalogEntry {
            title: "Sodium".to_string(),
            client_side: Compat::Required,
            server_side: Compat::NotFound,
            ..CatalogEntry::unenriched(&CatalogRow::new("sodium-0.5.8.jar", "sodium"))
        };

        let table = render_table(&[entry]);
        assert!(table.contains("Filename"));
        assert!(table.contains("sodium-0.5.8.jar"));
        assert!(table.contains("required"));
        assert!(table.contains("not_found"));
    }

    #[test]
    fn test_table_flags_issue_rows() {
        let ok = CatalogEntry {
            client_side: Compat::Required,
            server_side: Compat::Required,
            ..CatalogEntry::unenriched(&CatalogRow::new("ok.jar", "ok"))
        };
        let missing = CatalogEntry::with_outcome(&CatalogRow::new("x.jar", ""), Compat::NotFound);
        let failed = CatalogEntry::with_outcome(&CatalogRow::new("y.jar", "y"), Compat::Error);

        let table = render_table(&[ok.clone(), missing, failed]);
        assert!(table.contains("Issue"));
        assert!(table.contains("missing slug"));
        assert!(table.contains("lookup error"));

        let clean = render_table(&[ok]);
        assert!(!clean.contains("missing slug"));
        assert!(!clean.contains("not found"));
    }

    #[test]
    fn test_count_matches_either_side() {
        let row = CatalogRow::new("a.jar", "a");
        let entries = vec![
            CatalogEntry::with_outcome(&row, Compat::Error),
            CatalogEntry {
                server_side: Compat::Error,
                ..CatalogEntry::unenriched(&row)
            },
            CatalogEntry::unenriched(&row),
        ];
        assert_eq!(count(&entries, Compat::Error), 2);
    }
}
