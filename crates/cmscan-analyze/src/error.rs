//! Error types for cmscan-analyze.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for analysis operations.
pub type Result<T> = std::result::Result<T, AnalyzeError>;

/// Errors that can occur while driving the analysis run.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    /// The File API layer failed.
    #[error(transparent)]
    Api(#[from] cmscan_api::ApiError),

    /// The analysis plugin was not found beside the compiler.
    #[error("analysis plugin not found: {0}")]
    PluginNotFound(PathBuf),

    /// Failed to read the run configuration file.
    #[error("failed to read config file: {0}")]
    ReadConfig(#[from] std::io::Error),

    /// Failed to parse the TOML run configuration.
    #[error("failed to parse TOML config: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// The results directory could not be prepared.
    #[error("failed to prepare results directory {path}: {reason}")]
    ResultsDir { path: PathBuf, reason: String },

    /// The compiler process could not be launched.
    #[error("failed to launch {compiler}: {reason}")]
    CompilerLaunch { compiler: PathBuf, reason: String },

    /// A compiler analysis run exited with a failure status.
    #[error("analysis of {file} failed: {status}")]
    AnalysisFailed { file: PathBuf, status: String },
}
