//! Results directory management and SARIF log naming.

use crate::error::{AnalyzeError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Create the results directory if needed and delete SARIF logs left over
/// from a previous run, so the directory only ever holds this run's output.
pub fn prepare_results_dir(dir: &Path) -> Result<()> {
    let map_err = |e: std::io::Error| AnalyzeError::ResultsDir {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    };

    fs::create_dir_all(dir).map_err(map_err)?;
    let mut removed = 0usize;
    for entry in fs::read_dir(dir).map_err(map_err)?.flatten() {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "sarif") {
            fs::remove_file(&path).map_err(map_err)?;
            removed += 1;
        }
    }
    if removed > 0 {
        tracing::debug!(dir = %dir.display(), removed, "removed stale SARIF logs");
    }
    Ok(())
}

/// Log path for one analyzed source.
///
/// The ordinal keeps names collision-free when different directories contain
/// sources with the same file name.
pub fn sarif_log_path(results_dir: &Path, source: &Path, ordinal: usize) -> PathBuf {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("source");
    results_dir.join(format!("{stem}-{ordinal}.sarif"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_removes_stale_logs() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("analysis");
        fs::create_dir_all(&results).unwrap();
        fs::write(results.join("old-0.sarif"), "{}").unwrap();
        fs::write(results.join("keep.txt"), "").unwrap();

        prepare_results_dir(&results).unwrap();

        assert!(!results.join("old-0.sarif").exists());
        assert!(results.join("keep.txt").exists());
    }

    #[test]
    fn test_prepare_creates_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("a/b/analysis");
        prepare_results_dir(&results).unwrap();
        assert!(results.is_dir());
    }

    #[test]
    fn test_log_naming() {
        let path = sarif_log_path(Path::new("out"), Path::new("C:/proj/src/main.cpp"), 3);
        assert_eq!(path, Path::new("out").join("main-3.sarif"));
    }
}
