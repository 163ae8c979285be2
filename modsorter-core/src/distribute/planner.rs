//! Client/server allow-sets derived from compatibility classifications

use std::collections::BTreeSet;

use crate::catalog::{CatalogEntry, Compat};

/// Filenames permitted into one output directory
pub type AllowSet = BTreeSet<String>;

/// Allow-sets for both sides
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistributionPlan {
    pub client: AllowSet,
    pub server: AllowSet,
}

/// What one side's classification contributes to the plan
enum Placement {
    Include,
    /// Unknown to the service: ship it everywhere rather than risk dropping it
    Everywhere,
    Skip,
}

fn placement(compat: Compat) -> Placement {
    match compat {
        Compat::Required | Compat::Optional => Placement::Include,
        Compat::NotFound => Placement::Everywhere,
        Compat::Unsupported | Compat::Unknown | Compat::Error => Placement::Skip,
    }
}

/// Build the client and server allow-sets for `entries`
pub fn plan(entries: &[CatalogEntry]) -> DistributionPlan {
    let mut plan = DistributionPlan::default();

    for entry in entries {
        let client = placement(entry.client_side);
        let server = placement(entry.server_side);

        if matches!(client, Placement::Everywhere) || matches!(server, Placement::Everywhere) {
            plan.client.insert(entry.filename.clone());
            plan.server.insert(entry.filename.clone());
            continue;
        }
        if matches!(client, Placement::Include) {
            plan.client.insert(entry.filename.clone());
        }
        if matches!(server, Placement::Include) {
            plan.server.insert(entry.filename.clone());
        }
    }

    plan
}
