//! Error types for the enrichment pipeline, the catalog store and the
//! distribution step

use std::path::PathBuf;
use thiserror::Error;

/// Failure of a whole enrichment batch
///
/// Row-level lookup failures never show up here; they degrade the row to
/// `Compat::Error` instead.
#[derive(Error, Debug)]
pub enum EnrichError {
    /// A lookup task panicked or was cancelled before it produced a result
    #[error("Lookup task for row {index} ({filename}) did not complete")]
    TaskFailed {
        index: usize,
        filename: String,
        #[source]
        source: tokio::task::JoinError,
    },
}

/// Catalog file errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// The catalog file could not be opened or read
    #[error("Failed to read catalog file: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog file is not valid delimited text
    #[error("Invalid catalog format in file: {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The catalog file could not be written
    #[error("Failed to write catalog file: {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No catalog row has the given filename
    #[error("No catalog entry for {filename} in {path}")]
    UnknownEntry { path: PathBuf, filename: String },

    /// The catalog backup copy failed
    #[error("Failed to create catalog backup: {from} -> {to}")]
    Backup {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Structural failures of directory replacement and copy-in
///
/// Cleanup failures (clearing a target, moving the reserved subtree) are
/// logged and never surface as one of these.
#[derive(Error, Debug)]
pub enum DistributeError {
    /// Backing up an entry of the target failed; the target is untouched
    #[error("Failed to back up {path} into {backup}")]
    Backup {
        path: PathBuf,
        backup: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The target directory could not be recreated after clearing
    #[error("Failed to recreate target directory: {path}")]
    Recreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Copy-in was attempted before the destination was prepared
    #[error("Destination directory does not exist: {path}")]
    MissingDestination { path: PathBuf },

    /// The source archive directory could not be listed
    #[error("Failed to read contents of mods directory: {path}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Copying one allowed archive failed; the copy-in stops here
    #[error("Failed to copy mod file: {file} to {dest}")]
    Copy {
        file: String,
        dest: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backup and target directories overlap
    #[error("Refusing to replace {target} with backup {backup}: {reason}")]
    InvalidPlan {
        target: PathBuf,
        backup: PathBuf,
        reason: &'static str,
    },

    /// A replacement phase was run out of order
    #[error("Cannot {phase} {target}: replacement is in state {state}")]
    InvalidTransition {
        phase: &'static str,
        state: &'static str,
        target: PathBuf,
    },
}
