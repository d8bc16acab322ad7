//! Analysis plugin discovery.

use crate::error::{AnalyzeError, Result};
use std::path::{Path, PathBuf};

/// Filename of the MSVC code-analysis plugin module.
pub const ESPX_ENGINE: &str = "EspXEngine.dll";

/// Locate the analysis plugin for one compiler.
///
/// The plugin ships in the same directory as `cl.exe`; a missing module
/// means the toolset was installed without the code-analysis component.
pub fn find_espx_engine(compiler: &Path) -> Result<PathBuf> {
    let dir = compiler
        .parent()
        .ok_or_else(|| AnalyzeError::PluginNotFound(compiler.to_path_buf()))?;
    let plugin = dir.join(ESPX_ENGINE);
    if plugin.is_file() {
        Ok(plugin)
    } else {
        Err(AnalyzeError::PluginNotFound(plugin))
    }
}
