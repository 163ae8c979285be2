//! modsorter core library
//!
//! Reconciles a catalog of installed mod archives against the Modrinth
//! metadata service and redistributes the archives into client and server
//! directories based on their compatibility flags.
//!
//! ```text
//! catalog rows ──► catalog::reconcile ──► enrich::Enricher ──► Vec<CatalogEntry>
//!                                              │
//!                                   modrinth::MetadataSource
//!
//! Vec<CatalogEntry> ──► distribute::plan    ──► AllowSets
//!                   ──► distribute::replace (backup, clear, restore reserved)
//!                   ──► distribute::copy    (allowed archives only)
//! ```

pub mod catalog;
pub mod config;
pub mod distribute;
pub mod enrich;
pub mod error;
pub mod modrinth;

pub use catalog::{CatalogEntry, CatalogRow, Compat};
pub use config::SorterConfig;
pub use distribute::{Distributor, DistributionReport};
pub use enrich::Enricher;
pub use error::{DistributeError, EnrichError, StoreError};
