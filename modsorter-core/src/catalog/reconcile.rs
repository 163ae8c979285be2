//! Reconciliation of catalog rows against the archives on disk

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};
use walkdir::WalkDir;

use super::{base_identity, CatalogRow};

/// Outcome of matching catalog rows to scanned archives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Rows in catalog order, new archives appended at the end
    pub rows: Vec<CatalogRow>,
    /// Rows whose filename was bumped to a newer version
    pub updated: usize,
    /// Rows added for archives the catalog did not know
    pub added: usize,
}

impl Reconciliation {
    /// True when the catalog file needs rewriting
    pub fn changed(&self) -> bool {
        self.updated > 0 || self.added > 0
    }
}

/// List archive filenames directly inside `dir`, sorted by name
///
/// Extension matching is case-insensitive; directories are ignored.
pub fn scan_archives(dir: &Path, extension: &str) -> std::io::Result<Vec<String>> {
    let mut archives = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() || !has_extension(entry.path(), extension) {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            archives.push(name.to_string());
        }
    }

    archives.sort();
    debug!("Found {} archive(s) in {}", archives.len(), dir.display());
    Ok(archives)
}

pub(crate) fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// Match scanned archives to existing rows by base identity
///
/// A matching row whose filename differs takes the new filename (version
/// bump); an archive with no matching row becomes a new row with an empty
/// slug. The input rows are left untouched.
pub fn reconcile(rows: &[CatalogRow], archives: &[String]) -> Reconciliation {
    let mut rows = rows.to_vec();

    // Later rows win when two rows share an identity
    let mut by_identity: HashMap<String, usize> = HashMap::new();
    for (index, row) in rows.iter().enumerate() {
        by_identity.insert(base_identity(&row.filename), index);
    }

    let mut updated = 0;
    let mut added = 0;

    for filename in archives {
        let identity = base_identity(filename);
        match by_identity.get(&identity) {
            Some(&index) => {
                if rows[index].filename != *filename {
                    info!(
                        "Updated mod filename: {} -> {}",
                        rows[index].filename, filename
                    );
                    rows[index].filename = filename.clone();
                    updated += 1;
                }
            }
            None => {
                info!("Added new mod: {}", filename);
                by_identity.insert(identity, rows.len());
                rows.push(CatalogRow::new(filename.clone(), ""));
                added += 1;
            }
        }
    }

    Reconciliation {
        rows,
        updated,
        added,
    }
}
