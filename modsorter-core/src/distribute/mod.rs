//! Distribution of mod archives into client and server directories
//!
//! ```text
//! Vec<CatalogEntry> ──► plan ──► DistributionPlan { client, server }
//!                                        │
//! prepare(server), prepare(client) ──► copy_allowed(server), copy_allowed(client)
//! ```

mod copy;
mod planner;
mod replace;

pub use copy::{copy_allowed, CopyReport};
pub use planner::{plan, AllowSet, DistributionPlan};
pub use replace::{
    prepare, DirectoryReplacement, PrepareReport, ReplacementPlan, ReplacementState, ReservedHold,
};

use std::path::PathBuf;

use tracing::info;

use crate::catalog::CatalogEntry;
use crate::config::SorterConfig;
use crate::error::DistributeError;

/// Outcome of a full distribution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionReport {
    pub server_prepare: PrepareReport,
    pub client_prepare: PrepareReport,
    pub server_copy: CopyReport,
    pub client_copy: CopyReport,
    pub server_allowed: usize,
    pub client_allowed: usize,
}

/// Rebuilds both output directories from the mods directory
#[derive(Debug, Clone)]
pub struct Distributor {
    mods_dir: PathBuf,
    server: ReplacementPlan,
    client: ReplacementPlan,
    extension: String,
}

impl Distributor {
    pub fn new(
        mods_dir: impl Into<PathBuf>,
        server: ReplacementPlan,
        client: ReplacementPlan,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            mods_dir: mods_dir.into(),
            server,
            client,
            extension: extension.into(),
        }
    }

    pub fn from_config(config: &SorterConfig) -> Self {
        Self::new(
            config.mods_dir(),
            ReplacementPlan::new(
                config.server_output_dir(),
                config.server_backup_dir(),
                &config.reserved_dir,
            ),
            ReplacementPlan::new(
                config.client_output_dir(),
                config.client_backup_dir(),
                &config.reserved_dir,
            ),
            &config.archive_extension,
        )
    }

    /// Prepare both targets, then copy each side's allowed archives in
    pub fn distribute(
        &self,
        entries: &[CatalogEntry],
    ) -> Result<DistributionReport, DistributeError> {
        let server_prepare = prepare(&self.server)?;
        let client_prepare = prepare(&self.client)?;

        let plan = plan(entries);
        info!(
            "Distribution plan: {} server, {} client",
            plan.server.len(),
            plan.client.len()
        );

        let server_copy = copy_allowed(
            &plan.server,
            &self.mods_dir,
            &self.server.target,
            &self.extension,
        )?;
        let client_copy = copy_allowed(
            &plan.client,
            &self.mods_dir,
            &self.client.target,
            &self.extension,
        )?;

        Ok(DistributionReport {
            server_prepare,
            client_prepare,
            server_copy,
            client_copy,
            server_allowed: plan.server.len(),
            client_allowed: plan.client.len(),
        })
    }
}
