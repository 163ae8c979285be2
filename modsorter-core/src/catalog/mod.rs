//! Mod catalog - entries, identity matching and the on-disk catalog file
//!
//! The catalog is a delimited text file with one row per installed mod
//! archive. Every operation loads it, produces a fresh `Vec<CatalogEntry>`
//! and hands that snapshot back to the caller to persist.
//!
//! ```text
//! modlist.csv ──► CatalogStore::read_records ──► reconcile(scan_archives)
//!                                                       │
//!                                              Vec<CatalogRow> ──► Enricher
//! ```

mod entry;
pub mod identity;
mod reconcile;
mod store;

pub use entry::{is_unresolved_slug, CatalogEntry, CatalogRow, Compat};
pub use identity::base_identity;
pub(crate) use reconcile::has_extension;
pub use reconcile::{reconcile, scan_archives, Reconciliation};
pub use store::{backup_file, detect_separator, CatalogStore, HEADER};

#[cfg(test)]
mod tests;
