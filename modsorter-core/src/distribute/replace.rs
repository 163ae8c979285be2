//! Backup-and-clear of an output directory with one preserved subtree
//!
//! ```text
//! Start ──back_up──► BackedUp ──clear──► Cleared ──repopulate──► Repopulated ──finish──► Done
//!   │                   │
//!   │                   └─ extract_reserved (optional, stays BackedUp)
//!   └─ create_missing ─────────────────────────────────────────────────────────────────► Done
//! ```
//!
//! Backup failures abort before the target is touched. Clearing and moving
//! the reserved subtree are best effort: problems are logged and counted,
//! never returned.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::config::normalize_path;
use crate::error::DistributeError;

/// Suffix appended to the target's name to form the holding location
const HOLD_SUFFIX: &str = "_reserved_hold";

/// Which directory to replace, where its backup goes and what to keep
///
/// `new` drops trailing separators and `.` segments from both paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementPlan {
    pub target: PathBuf,
    pub backup: PathBuf,
    /// Name of the child of `target` that survives replacement
    pub reserved: String,
}

impl ReplacementPlan {
    pub fn new(
        target: impl Into<PathBuf>,
        backup: impl Into<PathBuf>,
        reserved: impl Into<String>,
    ) -> Self {
        Self {
            target: target.into().components().collect(),
            backup: backup.into().components().collect(),
            reserved: reserved.into(),
        }
    }

    /// `<target>_reserved_hold`, a sibling of the target
    ///
    /// Falls back to a child of the target when it has no final name
    /// (`/`, `..`); clearing never deletes it there.
    pub fn holding_dir(&self) -> PathBuf {
        match self.target.file_name() {
            Some(name) => {
                let mut hold = name.to_owned();
                hold.push(HOLD_SUFFIX);
                self.target.with_file_name(hold)
            }
            None => self.target.join(HOLD_SUFFIX),
        }
    }

    /// Reject plans where the backup and target directories overlap
    ///
    /// Paths are compared after normalization, so `./mods` and `mods/`
    /// are the same directory.
    pub fn validate(&self) -> Result<(), DistributeError> {
        let normalize = |p: &Path| normalize_path(&p.to_string_lossy());
        let target = normalize(&self.target);
        let backup = normalize(&self.backup);
        let holding = normalize(&self.holding_dir());

        let reason = if backup == target {
            "backup and target are the same directory"
        } else if backup.starts_with(&target) {
            "backup is inside the target"
        } else if target.starts_with(&backup) {
            "target is inside the backup"
        } else if backup.starts_with(&holding) || holding.starts_with(&backup) {
            "backup overlaps the reserved holding directory"
        } else {
            return Ok(());
        };

        Err(DistributeError::InvalidPlan {
            target: self.target.clone(),
            backup: self.backup.clone(),
            reason,
        })
    }

    fn reserved_path(&self) -> PathBuf {
        self.target.join(&self.reserved)
    }

    fn is_reserved(&self, name: &std::ffi::OsStr) -> bool {
        !self.reserved.is_empty() && name == self.reserved.as_str()
    }

    /// Children of the target that backup and clearing leave alone
    fn is_protected(&self, child: &Path) -> bool {
        child.file_name().is_some_and(|name| self.is_reserved(name))
            || child == self.holding_dir()
    }
}

/// Phase of a replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplacementState {
    Start,
    BackedUp,
    Cleared,
    Repopulated,
    Done,
}

impl ReplacementState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplacementState::Start => "start",
            ReplacementState::BackedUp => "backed_up",
            ReplacementState::Cleared => "cleared",
            ReplacementState::Repopulated => "repopulated",
            ReplacementState::Done => "done",
        }
    }
}

/// Where the reserved subtree currently lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservedHold {
    /// The target has no reserved subtree
    Absent,
    /// The subtree is inside the target
    InPlace,
    /// The subtree was moved out to this path
    Extracted(PathBuf),
}

/// Summary of one `prepare` run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrepareReport {
    /// The target did not exist and was created empty
    pub created: bool,
    pub reserved_present: bool,
    /// The reserved subtree is inside the target after the run
    pub reserved_preserved: bool,
    /// Direct children copied into the backup
    pub backed_up: usize,
    /// Direct children removed from the target
    pub cleared: usize,
    /// Children that could not be removed
    pub clear_failures: usize,
}

/// Replacement of one target directory, driven phase by phase
#[derive(Debug)]
pub struct DirectoryReplacement {
    plan: ReplacementPlan,
    state: ReplacementState,
    hold: ReservedHold,
    report: PrepareReport,
}

impl DirectoryReplacement {
    pub fn new(plan: ReplacementPlan) -> Self {
        Self {
            plan,
            state: ReplacementState::Start,
            hold: ReservedHold::Absent,
            report: PrepareReport::default(),
        }
    }

    pub fn state(&self) -> ReplacementState {
        self.state
    }

    pub fn hold(&self) -> &ReservedHold {
        &self.hold
    }

    pub fn report(&self) -> &PrepareReport {
        &self.report
    }

    fn require(
        &self,
        phase: &'static str,
        expected: ReplacementState,
    ) -> Result<(), DistributeError> {
        if self.state != expected {
            return Err(DistributeError::InvalidTransition {
                phase,
                state: self.state.as_str(),
                target: self.plan.target.clone(),
            });
        }
        Ok(())
    }

    /// Create a missing target empty and skip every other phase
    pub fn create_missing(&mut self) -> Result<(), DistributeError> {
        self.require("create", ReplacementState::Start)?;
        self.plan.validate()?;

        fs::create_dir_all(&self.plan.target).map_err(|source| DistributeError::Recreate {
            path: self.plan.target.clone(),
            source,
        })?;

        info!("Created missing directory: {}", self.plan.target.display());
        self.report.created = true;
        self.state = ReplacementState::Done;
        Ok(())
    }

    /// Replace the backup with a copy of everything but the reserved subtree
    pub fn back_up(&mut self) -> Result<(), DistributeError> {
        self.require("back up", ReplacementState::Start)?;
        self.plan.validate()?;

        let plan = &self.plan;
        let reserved_present = !plan.reserved.is_empty() && plan.reserved_path().exists();
        self.report.reserved_present = reserved_present;
        self.hold = if reserved_present {
            ReservedHold::InPlace
        } else {
            ReservedHold::Absent
        };

        let backup_err = |path: &Path, source: io::Error| DistributeError::Backup {
            path: path.to_path_buf(),
            backup: plan.backup.clone(),
            source,
        };

        // Single generation: the previous backup is discarded
        if plan.backup.exists() {
            remove_entry(&plan.backup).map_err(|e| backup_err(&plan.backup, e))?;
        }
        fs::create_dir_all(&plan.backup).map_err(|e| backup_err(&plan.backup, e))?;

        let children = fs::read_dir(&plan.target).map_err(|e| backup_err(&plan.target, e))?;
        let mut backed_up = 0;
        for child in children {
            let child = child.map_err(|e| backup_err(&plan.target, e))?;
            let from = child.path();
            if plan.is_protected(&from) {
                continue;
            }

            let to = plan.backup.join(child.file_name());
            let copied = if from.is_dir() {
                copy_tree(&from, &to)
            } else {
                fs::copy(&from, &to).map(|_| ())
            };
            if let Err(e) = copied {
                error!("Failed to back up {}: {}", from.display(), e);
                return Err(backup_err(&from, e));
            }
            backed_up += 1;
        }

        info!(
            "Backed up {} entries from {} to {}",
            backed_up,
            plan.target.display(),
            plan.backup.display()
        );
        self.report.backed_up = backed_up;
        self.state = ReplacementState::BackedUp;
        Ok(())
    }

    /// Move the reserved subtree to the holding location
    ///
    /// On failure the subtree stays where it is and clearing skips it.
    pub fn extract_reserved(&mut self) -> Result<(), DistributeError> {
        self.require("extract reserved subtree of", ReplacementState::BackedUp)?;
        if self.hold != ReservedHold::InPlace {
            return Ok(());
        }

        let holding = self.plan.holding_dir();
        if holding.exists() {
            debug!("Removing stale holding directory: {}", holding.display());
            if let Err(e) = remove_entry(&holding) {
                warn!(
                    "Failed to remove stale holding directory {}: {}",
                    holding.display(),
                    e
                );
            }
        }

        let held = holding.join(&self.plan.reserved);
        let moved = fs::create_dir_all(&holding)
            .and_then(|_| fs::rename(self.plan.reserved_path(), &held));
        match moved {
            Ok(()) => {
                debug!("Moved {} to {}", self.plan.reserved, held.display());
                self.hold = ReservedHold::Extracted(held);
            }
            Err(e) => {
                error!(
                    "Failed to move {} out of {}: {}",
                    self.plan.reserved,
                    self.plan.target.display(),
                    e
                );
                if holding.exists() {
                    if let Err(e) = remove_entry(&holding) {
                        warn!(
                            "Failed to remove holding directory {}: {}",
                            holding.display(),
                            e
                        );
                    }
                }
            }
        }
        Ok(())
    }

    /// Delete every child of the target except the reserved name
    pub fn clear(&mut self) -> Result<(), DistributeError> {
        self.require("clear", ReplacementState::BackedUp)?;

        match fs::read_dir(&self.plan.target) {
            Ok(children) => {
                for child in children.flatten() {
                    let path = child.path();
                    if self.plan.is_protected(&path) {
                        continue;
                    }
                    match remove_entry(&path) {
                        Ok(()) => self.report.cleared += 1,
                        Err(e) => {
                            error!("Failed to delete {}: {}", path.display(), e);
                            self.report.clear_failures += 1;
                        }
                    }
                }
            }
            Err(e) => {
                error!("Failed to list {}: {}", self.plan.target.display(), e);
                self.report.clear_failures += 1;
            }
        }

        if self.report.clear_failures > 0 {
            warn!(
                "{} entries could not be removed from {}",
                self.report.clear_failures,
                self.plan.target.display()
            );
        }
        self.state = ReplacementState::Cleared;
        Ok(())
    }

    /// Recreate the target and bring the reserved subtree back
    pub fn repopulate(&mut self) -> Result<(), DistributeError> {
        self.require("repopulate", ReplacementState::Cleared)?;

        fs::create_dir_all(&self.plan.target).map_err(|source| DistributeError::Recreate {
            path: self.plan.target.clone(),
            source,
        })?;

        if let ReservedHold::Extracted(held) = self.hold.clone() {
            let live = self.plan.reserved_path();
            if live.exists() {
                warn!(
                    "{} was re-created during replacement, discarding held copy",
                    live.display()
                );
                if let Err(e) = remove_entry(&held) {
                    warn!("Failed to discard {}: {}", held.display(), e);
                }
                self.hold = ReservedHold::InPlace;
            } else {
                match fs::rename(&held, &live) {
                    Ok(()) => {
                        debug!("Restored {}", live.display());
                        self.hold = ReservedHold::InPlace;
                    }
                    Err(e) => {
                        error!("Failed to restore {}: {}", live.display(), e);
                    }
                }
            }

            let holding = self.plan.holding_dir();
            if holding.exists() {
                if let Err(e) = remove_entry(&holding) {
                    warn!(
                        "Failed to remove holding directory {}: {}",
                        holding.display(),
                        e
                    );
                }
            }
        }

        self.report.reserved_preserved =
            self.report.reserved_present && self.plan.reserved_path().exists();
        self.state = ReplacementState::Repopulated;
        Ok(())
    }

    /// Close the replacement and hand back its report
    pub fn finish(mut self) -> Result<PrepareReport, DistributeError> {
        self.require("finish", ReplacementState::Repopulated)?;
        self.state = ReplacementState::Done;
        Ok(self.report)
    }
}

/// Back up, clear and recreate `plan.target`, keeping the reserved subtree
pub fn prepare(plan: &ReplacementPlan) -> Result<PrepareReport, DistributeError> {
    let mut replacement = DirectoryReplacement::new(plan.clone());

    if !plan.target.exists() {
        replacement.create_missing()?;
        return Ok(replacement.report().clone());
    }

    replacement.back_up()?;
    replacement.extract_reserved()?;
    replacement.clear()?;
    replacement.repopulate()?;
    let report = replacement.finish()?;

    info!(
        "Prepared {} ({} cleared, {} failures, reserved kept: {})",
        plan.target.display(),
        report.cleared,
        report.clear_failures,
        report.reserved_preserved
    );
    Ok(report)
}

/// Copy a directory tree, creating `to` and any missing parents
fn copy_tree(from: &Path, to: &Path) -> io::Result<()> {
    for entry in WalkDir::new(from) {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(io::Error::other)?;
        let dest = to.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest)?;
        } else {
            fs::copy(entry.path(), &dest)?;
        }
    }
    Ok(())
}

/// Remove a file, symlink or whole directory
fn remove_entry(path: &Path) -> io::Result<()> {
    if fs::symlink_metadata(path)?.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const RESERVED: &str = ".connector";

    fn setup() -> (TempDir, ReplacementPlan) {
        let temp_dir = TempDir::new().unwrap();
        let plan = ReplacementPlan::new(
            temp_dir.path().join("server_mods"),
            temp_dir.path().join("server_mods_backup"),
            RESERVED,
        );
        (temp_dir, plan)
    }

    fn names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_backup_then_clear_without_reserved() {
        let (_temp, plan) = setup();
        fs::create_dir_all(&plan.target).unwrap();
        fs::write(plan.target.join("a.jar"), b"a").unwrap();
        fs::write(plan.target.join("b.jar"), b"b").unwrap();

        let report = prepare(&plan).unwrap();

        assert_eq!(names(&plan.backup), vec!["a.jar", "b.jar"]);
        assert_eq!(fs::read(plan.backup.join("b.jar")).unwrap(), b"b");
        assert!(names(&plan.target).is_empty());
        assert_eq!(report.backed_up, 2);
        assert_eq!(report.cleared, 2);
        assert!(!report.reserved_present);
    }

    #[test]
    fn test_reserved_subtree_round_trip() {
        let (_temp, plan) = setup();
        let reserved = plan.target.join(RESERVED);
        fs::create_dir_all(reserved.join("nested")).unwrap();
        fs::write(reserved.join("x"), b"keep me").unwrap();
        fs::write(reserved.join("nested").join("y"), b"deep").unwrap();
        fs::write(plan.target.join("a.jar"), b"a").unwrap();

        let report = prepare(&plan).unwrap();

        assert_eq!(names(&plan.target), vec![RESERVED]);
        assert_eq!(fs::read(reserved.join("x")).unwrap(), b"keep me");
        assert_eq!(fs::read(reserved.join("nested").join("y")).unwrap(), b"deep");
        assert_eq!(names(&plan.backup), vec!["a.jar"]);
        assert!(!plan.holding_dir().exists());
        assert!(report.reserved_present);
        assert!(report.reserved_preserved);
    }

    #[test]
    fn test_prepare_is_idempotent() {
        let (_temp, plan) = setup();
        fs::create_dir_all(plan.target.join(RESERVED)).unwrap();
        fs::write(plan.target.join(RESERVED).join("x"), b"x").unwrap();
        fs::write(plan.target.join("a.jar"), b"a").unwrap();

        prepare(&plan).unwrap();
        let after_first = names(&plan.target);
        let second = prepare(&plan).unwrap();

        assert_eq!(names(&plan.target), after_first);
        assert_eq!(after_first, vec![RESERVED]);
        assert_eq!(fs::read(plan.target.join(RESERVED).join("x")).unwrap(), b"x");
        assert_eq!(second.cleared, 0);
        assert!(second.reserved_preserved);
    }

    #[test]
    fn test_missing_target_is_created() {
        let (_temp, plan) = setup();

        let report = prepare(&plan).unwrap();

        assert!(report.created);
        assert!(plan.target.is_dir());
        assert!(!plan.backup.exists());
    }

    #[test]
    fn test_stale_backup_is_replaced() {
        let (_temp, plan) = setup();
        fs::create_dir_all(&plan.backup).unwrap();
        fs::write(plan.backup.join("old.jar"), b"old").unwrap();
        fs::create_dir_all(&plan.target).unwrap();
        fs::write(plan.target.join("new.jar"), b"new").unwrap();

        prepare(&plan).unwrap();

        assert_eq!(names(&plan.backup), vec!["new.jar"]);
    }

    #[test]
    fn test_directories_are_backed_up_recursively() {
        let (_temp, plan) = setup();
        fs::create_dir_all(plan.target.join("config").join("sub")).unwrap();
        fs::write(plan.target.join("config").join("sub").join("c.toml"), b"c").unwrap();

        prepare(&plan).unwrap();

        assert_eq!(
            fs::read(plan.backup.join("config").join("sub").join("c.toml")).unwrap(),
            b"c"
        );
        assert!(names(&plan.target).is_empty());
    }

    #[test]
    fn test_out_of_order_phases_are_rejected() {
        let (_temp, plan) = setup();
        fs::create_dir_all(&plan.target).unwrap();
        let mut replacement = DirectoryReplacement::new(plan);

        assert!(matches!(
            replacement.clear(),
            Err(DistributeError::InvalidTransition { state: "start", .. })
        ));
        assert!(matches!(
            replacement.repopulate(),
            Err(DistributeError::InvalidTransition { .. })
        ));

        replacement.back_up().unwrap();
        assert!(matches!(
            replacement.back_up(),
            Err(DistributeError::InvalidTransition {
                state: "backed_up",
                ..
            })
        ));
        replacement.clear().unwrap();
        assert_eq!(replacement.state(), ReplacementState::Cleared);
        assert!(replacement.extract_reserved().is_err());
        replacement.repopulate().unwrap();
        assert!(replacement.finish().is_ok());
    }

    #[test]
    fn test_held_copy_is_discarded_when_reserved_reappears() {
        let (_temp, plan) = setup();
        fs::create_dir_all(plan.target.join(RESERVED)).unwrap();
        fs::write(plan.target.join(RESERVED).join("x"), b"held").unwrap();

        let mut replacement = DirectoryReplacement::new(plan.clone());
        replacement.back_up().unwrap();
        replacement.extract_reserved().unwrap();
        assert!(matches!(replacement.hold(), ReservedHold::Extracted(_)));
        replacement.clear().unwrap();

        // Something else puts a fresh subtree in place before restoration
        fs::create_dir_all(plan.target.join(RESERVED)).unwrap();
        fs::write(plan.target.join(RESERVED).join("x"), b"live").unwrap();

        replacement.repopulate().unwrap();
        let report = replacement.finish().unwrap();

        assert_eq!(fs::read(plan.target.join(RESERVED).join("x")).unwrap(), b"live");
        assert!(!plan.holding_dir().exists());
        assert!(report.reserved_preserved);
    }

    #[test]
    fn test_backup_failure_leaves_target_untouched() {
        let (temp, plan) = setup();
        fs::create_dir_all(&plan.target).unwrap();
        fs::write(plan.target.join("a.jar"), b"a").unwrap();

        // A regular file where the backup's parent directory should be
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, b"").unwrap();
        let plan = ReplacementPlan::new(&plan.target, blocker.join("backup"), RESERVED);

        let err = prepare(&plan).unwrap_err();

        assert!(matches!(err, DistributeError::Backup { .. }));
        assert_eq!(names(&plan.target), vec!["a.jar"]);
    }

    #[test]
    fn test_trailing_slash_target_keeps_reserved() {
        let (temp, _) = setup();
        let target = temp.path().join("server_mods");
        fs::create_dir_all(target.join(RESERVED)).unwrap();
        fs::write(target.join(RESERVED).join("x"), b"keep me").unwrap();
        fs::write(target.join("a.jar"), b"a").unwrap();

        let plan = ReplacementPlan::new(
            format!("{}/", target.display()),
            temp.path().join("server_mods_backup"),
            RESERVED,
        );
        assert_eq!(plan.target, target);
        assert_eq!(plan.holding_dir(), temp.path().join("server_mods_reserved_hold"));

        let report = prepare(&plan).unwrap();

        assert_eq!(names(&target), vec![RESERVED]);
        assert_eq!(fs::read(target.join(RESERVED).join("x")).unwrap(), b"keep me");
        assert!(report.reserved_preserved);
        assert!(!plan.holding_dir().exists());
    }

    #[test]
    fn test_holding_dir_ignores_trailing_separator_in_fields() {
        let plan = ReplacementPlan {
            target: PathBuf::from("/srv/client_mods/"),
            backup: PathBuf::from("/srv/bak"),
            reserved: RESERVED.to_string(),
        };
        assert_eq!(
            plan.holding_dir(),
            PathBuf::from("/srv/client_mods_reserved_hold")
        );
    }

    #[test]
    fn test_backup_equal_to_target_is_rejected() {
        let (_temp, plan) = setup();
        fs::create_dir_all(&plan.target).unwrap();
        fs::write(plan.target.join("a.jar"), b"a").unwrap();
        let same = ReplacementPlan::new(
            &plan.target,
            plan.target.join(".").join("..").join("server_mods"),
            RESERVED,
        );

        let err = prepare(&same).unwrap_err();

        assert!(matches!(err, DistributeError::InvalidPlan { .. }));
        assert_eq!(names(&plan.target), vec!["a.jar"]);
    }

    #[test]
    fn test_nested_backup_is_rejected() {
        let (_temp, plan) = setup();
        fs::create_dir_all(&plan.target).unwrap();
        fs::write(plan.target.join("a.jar"), b"a").unwrap();

        let inside = ReplacementPlan::new(&plan.target, plan.target.join("bak"), RESERVED);
        assert!(matches!(
            prepare(&inside),
            Err(DistributeError::InvalidPlan {
                reason: "backup is inside the target",
                ..
            })
        ));

        let outside = ReplacementPlan::new(&plan.target, plan.target.parent().unwrap(), RESERVED);
        let mut replacement = DirectoryReplacement::new(outside);
        assert!(matches!(
            replacement.back_up(),
            Err(DistributeError::InvalidPlan {
                reason: "target is inside the backup",
                ..
            })
        ));
        assert_eq!(replacement.state(), ReplacementState::Start);
        assert_eq!(names(&plan.target), vec!["a.jar"]);
    }

    #[test]
    fn test_vanished_target_counts_clear_failure() {
        let (_temp, plan) = setup();
        fs::create_dir_all(&plan.target).unwrap();
        fs::write(plan.target.join("a.jar"), b"a").unwrap();

        let mut replacement = DirectoryReplacement::new(plan.clone());
        replacement.back_up().unwrap();
        fs::remove_dir_all(&plan.target).unwrap();
        replacement.extract_reserved().unwrap();
        replacement.clear().unwrap();
        assert_eq!(replacement.report().clear_failures, 1);

        replacement.repopulate().unwrap();
        let report = replacement.finish().unwrap();

        assert!(plan.target.is_dir());
        assert_eq!(report.cleared, 0);
        assert_eq!(names(&plan.backup), vec!["a.jar"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_undeletable_entry_is_counted_and_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let (_temp, plan) = setup();
        let locked = plan.target.join("locked");
        fs::create_dir_all(&locked).unwrap();
        fs::write(locked.join("inner.jar"), b"i").unwrap();
        fs::write(plan.target.join("a.jar"), b"a").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        // Privileged users ignore directory permissions
        let canary = locked.join("canary");
        if fs::write(&canary, b"").is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = prepare(&plan);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        let report = result.unwrap();

        assert_eq!(report.clear_failures, 1);
        assert_eq!(report.cleared, 1);
        assert_eq!(names(&plan.target), vec!["locked"]);
        assert_eq!(fs::read(plan.backup.join("locked").join("inner.jar")).unwrap(), b"i");
    }

    #[test]
    fn test_lost_held_copy_reports_not_preserved() {
        let (_temp, plan) = setup();
        fs::create_dir_all(plan.target.join(RESERVED)).unwrap();
        fs::write(plan.target.join(RESERVED).join("x"), b"x").unwrap();
        fs::write(plan.target.join("a.jar"), b"a").unwrap();

        let mut replacement = DirectoryReplacement::new(plan.clone());
        replacement.back_up().unwrap();
        replacement.extract_reserved().unwrap();
        replacement.clear().unwrap();
        fs::remove_dir_all(plan.holding_dir()).unwrap();

        replacement.repopulate().unwrap();
        let report = replacement.finish().unwrap();

        assert!(report.reserved_present);
        assert!(!report.reserved_preserved);
        assert!(plan.target.is_dir());
        assert!(names(&plan.target).is_empty());
    }

    #[test]
    fn test_failed_extraction_removes_holding_dir() {
        let (_temp, plan) = setup();
        fs::create_dir_all(plan.target.join(RESERVED)).unwrap();
        fs::write(plan.target.join("a.jar"), b"a").unwrap();

        let mut replacement = DirectoryReplacement::new(plan.clone());
        replacement.back_up().unwrap();
        // Gone between the existence check and the move
        fs::remove_dir_all(plan.target.join(RESERVED)).unwrap();
        replacement.extract_reserved().unwrap();

        assert_eq!(replacement.hold(), &ReservedHold::InPlace);
        assert!(!plan.holding_dir().exists());
    }

    #[test]
    fn test_holding_dir_is_sibling() {
        let plan = ReplacementPlan::new("/srv/client_mods", "/srv/bak", RESERVED);
        assert_eq!(
            plan.holding_dir(),
            PathBuf::from("/srv/client_mods_reserved_hold")
        );
    }
}
