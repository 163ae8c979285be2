//! Copy-in of allowed archives from the mods directory

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use super::planner::AllowSet;
use crate::catalog::has_extension;
use crate::error::DistributeError;

/// Counts from one copy-in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyReport {
    /// Archives found in the source directory
    pub matched: usize,
    /// Archives copied because they were allowed
    pub copied: usize,
}

/// Copy every archive in `source` whose name is in `allow` into `dest`
///
/// `dest` must exist. Existing files with the same name are overwritten and
/// the first failed copy aborts the run.
pub fn copy_allowed(
    allow: &AllowSet,
    source: &Path,
    dest: &Path,
    extension: &str,
) -> Result<CopyReport, DistributeError> {
    if !dest.is_dir() {
        return Err(DistributeError::MissingDestination {
            path: dest.to_path_buf(),
        });
    }

    let read_err = |e| DistributeError::SourceRead {
        path: source.to_path_buf(),
        source: e,
    };

    let mut report = CopyReport::default();
    for entry in fs::read_dir(source).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let path = entry.path();
        if !path.is_file() || !has_extension(&path, extension) {
            continue;
        }
        report.matched += 1;

        let name = entry.file_name().to_string_lossy().to_string();
        if !allow.contains(&name) {
            debug!("Skipping {} (not allowed for {})", name, dest.display());
            continue;
        }

        fs::copy(&path, dest.join(&name)).map_err(|e| DistributeError::Copy {
            file: name.clone(),
            dest: dest.to_path_buf(),
            source: e,
        })?;
        debug!("Copied {}", name);
        report.copied += 1;
    }

    info!(
        "Copied {} of {} archives to {}",
        report.copied,
        report.matched,
        dest.display()
    );
    Ok(report)
}
