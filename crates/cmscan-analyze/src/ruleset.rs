//! Ruleset file resolution.

use std::path::{Path, PathBuf};

/// Resolve a configured ruleset name or path against a set of search
/// directories.
///
/// An absolute path that exists is taken as-is; otherwise every search
/// directory is probed in order. `None` (with a warning) means the run
/// proceeds with the plugin's default rules.
pub fn resolve_ruleset(search_dirs: &[PathBuf], ruleset: &str) -> Option<PathBuf> {
    let direct = Path::new(ruleset);
    if direct.is_absolute() && direct.is_file() {
        return Some(direct.to_path_buf());
    }

    for dir in search_dirs {
        let candidate = dir.join(ruleset);
        if candidate.is_file() {
            return Some(candidate);
        }
    }

    tracing::warn!(
        ruleset,
        "ruleset not found in any search directory, using default rules"
    );
    None
}
