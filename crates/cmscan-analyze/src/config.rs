//! Run configuration (`cmscan.toml` format).

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root run configuration.
///
/// ```toml
/// # cmscan.toml
/// [analyze]
/// ruleset = "NativeRecommendedRules.ruleset"
/// ruleset-dirs = ["C:/rulesets"]
/// results-dir = "analysis"
/// ignored-paths = ["C:/vcpkg", "third-party"]
/// external-includes = true
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub analyze: AnalyzeConfig,
}

/// The `[analyze]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AnalyzeConfig {
    /// Ruleset name or absolute path. None runs with the plugin defaults.
    #[serde(default)]
    pub ruleset: Option<String>,

    /// Directories searched for a relative ruleset name.
    #[serde(default)]
    pub ruleset_dirs: Vec<PathBuf>,

    /// Where SARIF logs are written (default: `analysis` under the build
    /// directory).
    #[serde(default)]
    pub results_dir: Option<PathBuf>,

    /// Path prefixes excluded from analysis, exported to the compiler via
    /// `CAExcludePath`.
    #[serde(default)]
    pub ignored_paths: Vec<PathBuf>,

    /// Emit include directories with `/external:I` where the compiler
    /// supports it.
    #[serde(default)]
    pub external_includes: bool,
}

impl RunConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RunConfig = toml::from_str(&content)?;
        Ok(config)
    }
}
