//! Toolchain resolution.
//!
//! The compiler identity per language comes from one of two places: the
//! dedicated `toolchains` reply when the build tool emitted one, or a cache
//! fallback that pattern-matches `CMAKE_<LANG>_COMPILER` against the MSVC
//! installation layout. The resolved set records which stage won so callers
//! and tests can tell the paths apart.

use crate::cache::CacheModel;
use crate::error::{ApiError, Result};
use crate::reply::{parse_reply_str, read_reply_file};
use crate::version::ToolVersion;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Languages the client reconstructs compile commands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    C,
    Cxx,
}

impl Language {
    /// Map a File API language tag onto a supported language.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "C" => Some(Self::C),
            "CXX" => Some(Self::Cxx),
            _ => None,
        }
    }

    fn cache_compiler_var(self) -> &'static str {
        match self {
            Self::C => "CMAKE_C_COMPILER",
            Self::Cxx => "CMAKE_CXX_COMPILER",
        }
    }
}

/// Resolved identity of one compiler: executable, version, default includes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerInfo {
    pub path: PathBuf,
    pub version: String,
    pub includes: Vec<PathBuf>,
}

impl CompilerInfo {
    /// Whether this compiler version handles `/external:I` includes.
    ///
    /// MSVC grew full external-header support at compiler 19.29, which ships
    /// as toolset 14.29; both version schemes appear here depending on which
    /// resolution stage produced the info.
    pub fn supports_external_includes(&self) -> bool {
        let Ok(v) = self.version.parse::<ToolVersion>() else {
            return false;
        };
        match v.major {
            14 | 19 => v.minor >= 29,
            m => m > 14 && m != 19,
        }
    }
}

/// Which resolution stage produced the toolchain set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolchainSource {
    /// The dedicated `toolchains` reply document.
    Reply,
    /// Cache variables plus the MSVC directory-layout convention.
    CacheFallback,
}

/// The per-language compilers in use, plus the stage that resolved them.
#[derive(Debug)]
pub struct Toolchains {
    pub source: ToolchainSource,
    c: Option<CompilerInfo>,
    cxx: Option<CompilerInfo>,
}

#[derive(Debug, Deserialize)]
struct ToolchainsFile {
    #[serde(default)]
    toolchains: Vec<ToolchainEntry>,
}

#[derive(Debug, Deserialize)]
struct ToolchainEntry {
    #[serde(default)]
    language: String,
    compiler: CompilerDesc,
}

#[derive(Debug, Deserialize)]
struct CompilerDesc {
    #[serde(default)]
    path: Option<PathBuf>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    implicit: ImplicitInfo,
}

#[derive(Debug, Default, Deserialize)]
struct ImplicitInfo {
    #[serde(default, rename = "includeDirectories")]
    include_directories: Vec<PathBuf>,
}

impl Toolchains {
    /// Resolve compilers for C and C++.
    ///
    /// The toolchains reply is preferred when present; older build tools
    /// never emit one, so absence switches to the cache fallback. Fails with
    /// [`ApiError::NoSupportedCompiler`] when neither language resolves under
    /// the applicable stage.
    pub fn resolve(toolchains_reply: Option<&Path>, cache: &CacheModel) -> Result<Self> {
        let resolved = match toolchains_reply {
            Some(path) => Self::from_reply(path)?,
            None => Self::from_cache(cache),
        };
        if resolved.c.is_none() && resolved.cxx.is_none() {
            return Err(ApiError::NoSupportedCompiler);
        }
        tracing::debug!(
            source = ?resolved.source,
            c = resolved.c.is_some(),
            cxx = resolved.cxx.is_some(),
            "resolved toolchains"
        );
        Ok(resolved)
    }

    /// Load toolchains from a toolchains reply document. Entries whose
    /// language is not C/C++ or whose compiler family is not MSVC are
    /// ignored.
    pub fn from_reply(path: &Path) -> Result<Self> {
        let file: ToolchainsFile = read_reply_file(path)?;
        Ok(Self::from_entries(file))
    }

    /// Parse toolchains from a JSON string.
    pub fn from_reply_str(json: &str) -> Result<Self> {
        let file: ToolchainsFile = parse_reply_str("toolchains reply", json)?;
        Ok(Self::from_entries(file))
    }

    fn from_entries(file: ToolchainsFile) -> Self {
        let mut result = Self {
            source: ToolchainSource::Reply,
            c: None,
            cxx: None,
        };
        for entry in file.toolchains {
            let Some(language) = Language::from_tag(&entry.language) else {
                continue;
            };
            if entry.compiler.id.as_deref() != Some("MSVC") {
                continue;
            }
            let Some(path) = entry.compiler.path else {
                continue;
            };
            let info = CompilerInfo {
                path,
                version: entry.compiler.version.unwrap_or_default(),
                includes: entry.compiler.implicit.include_directories,
            };
            match language {
                Language::C => result.c = Some(info),
                Language::Cxx => result.cxx = Some(info),
            }
        }
        result
    }

    /// Derive toolchains from cache variables and the MSVC install layout.
    pub fn from_cache(cache: &CacheModel) -> Self {
        Self {
            source: ToolchainSource::CacheFallback,
            c: compiler_from_cache(cache, Language::C),
            cxx: compiler_from_cache(cache, Language::Cxx),
        }
    }

    /// The resolved compiler for one language, if any.
    pub fn get(&self, language: Language) -> Option<&CompilerInfo> {
        match language {
            Language::C => self.c.as_ref(),
            Language::Cxx => self.cxx.as_ref(),
        }
    }
}

/// Recognize an MSVC compiler from its cache variable.
///
/// The binary lives at `<toolset>/bin/Host<arch>/<arch>/cl.exe`, so the
/// directory three levels above the binary's directory is the toolset root;
/// its basename is the toolset version and its `include` child holds the
/// default headers.
fn compiler_from_cache(cache: &CacheModel, language: Language) -> Option<CompilerInfo> {
    let path = PathBuf::from(cache.get(language.cache_compiler_var())?);
    let file_name = path.file_name()?.to_str()?;
    if !file_name.eq_ignore_ascii_case("cl.exe") {
        return None;
    }

    let toolset = path.parent()?.parent()?.parent()?.parent()?;
    let version = toolset.file_name()?.to_str()?;
    if version.parse::<ToolVersion>().is_err() {
        return None;
    }

    Some(CompilerInfo {
        version: version.to_string(),
        includes: vec![toolset.join("include")],
        path,
    })
}
