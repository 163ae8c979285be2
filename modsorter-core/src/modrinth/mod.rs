//! Remote metadata lookups against Modrinth
//!
//! `MetadataSource` is the seam the enrichment pipeline depends on;
//! `ModrinthClient` is the production implementation.

mod backend;
mod client;

pub use backend::{LookupResult, MetadataSource};
pub use client::{ModrinthClient, USER_AGENT};
