//! Error types for cmscan-api.

use crate::version::ToolVersion;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for File API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors that can occur while reading File API metadata.
///
/// Every variant is fatal: a failed load leaves the session unusable and no
/// partial model is ever returned. There is no retry policy because reply
/// documents are written synchronously by the configure step immediately
/// before being read; a missing or malformed file reflects a real upstream
/// failure, not a race.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The build directory has no `.cmake/api/v1` metadata directory.
    #[error("no File API metadata directory: {0}")]
    BuildDirNotFound(PathBuf),

    /// A reply file referenced by the index is missing on disk.
    #[error("reply file not found: {0}")]
    ReplyNotFound(PathBuf),

    /// A reply file could not be read or did not contain valid JSON.
    #[error("failed to parse reply {path}: {reason}")]
    ReplyParseError { path: String, reason: String },

    /// No index document exists in the reply directory.
    #[error("no index file in reply directory: {0}")]
    IndexNotFound(PathBuf),

    /// The codemodel reply is missing required structure.
    #[error("malformed codemodel: {0}")]
    CodemodelParseError(String),

    /// Neither a C nor a C++ MSVC compiler could be resolved.
    #[error("project uses no supported C or C++ compiler (MSVC cl.exe required)")]
    NoSupportedCompiler,

    /// The build tool is older than the minimum supported version.
    #[error("cmake {found} is older than the minimum supported version {minimum}")]
    UnsupportedVersion {
        found: ToolVersion,
        minimum: ToolVersion,
    },

    /// The query descriptor could not be written.
    #[error("failed to write query {path}: {reason}")]
    QueryWriteError { path: PathBuf, reason: String },

    /// The configure-mode regeneration run failed.
    #[error("cmake configure run failed: {0}")]
    ConfigureFailed(String),

    /// Compile commands were requested before a successful `load_api`.
    #[error("compile commands requested before load_api succeeded")]
    NotLoaded,

    /// `load_api` was called on a session that is already loaded.
    #[error("load_api called twice on one session")]
    AlreadyLoaded,
}
