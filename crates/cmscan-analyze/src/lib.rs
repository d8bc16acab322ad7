//! MSVC code analysis driver for cmscan.
//!
//! This crate wraps the compile commands reconstructed by `cmscan-api` with
//! everything an analysis run needs around them:
//! - discovery of the EspXEngine analysis plugin beside the compiler
//! - ruleset file resolution
//! - per-source `cl.exe /analyze` invocations writing SARIF logs
//! - results-directory preparation and stale-log cleanup
//! - run configuration (`cmscan.toml`)

mod config;
mod error;
mod plugin;
mod results;
mod ruleset;
mod runner;

pub use config::{AnalyzeConfig, RunConfig};
pub use error::{AnalyzeError, Result};
pub use plugin::{find_espx_engine, ESPX_ENGINE};
pub use results::{prepare_results_dir, sarif_log_path};
pub use ruleset::resolve_ruleset;
pub use runner::{Analyzer, RunSummary};
