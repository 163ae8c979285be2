//! Base identity of a versioned archive filename
//!
//! `sodium-fabric-0.5.3+mc1.20.1.jar` and `sodium-fabric-0.5.8+mc1.20.4.jar`
//! both resolve to `sodium-fabric`, which is how a version bump on disk is
//! matched back to its existing catalog row.

use once_cell::sync::Lazy;
use regex::Regex;

/// A dash followed by a digit starts the version suffix
static VERSION_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-\d").expect("version suffix pattern is valid"));

/// Strip the extension and any trailing `-<version>` from a filename
pub fn base_identity(filename: &str) -> String {
    let stem = strip_extension(filename);

    match VERSION_SUFFIX.find(stem) {
        Some(m) if m.start() > 0 => stem[..m.start()].to_string(),
        _ => stem.to_string(),
    }
}

fn strip_extension(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(dot) if dot > 0 => &filename[..dot],
        _ => filename,
    }
}
