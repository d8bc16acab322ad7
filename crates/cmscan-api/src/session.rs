//! API session: load orchestration and compile command iteration.

use crate::cache::CacheModel;
use crate::codemodel::{load_target, Codemodel, TargetDocument};
use crate::command::{
    join_arguments, synthesize_arguments, CommandOptions, CompileCommand,
};
use crate::error::{ApiError, Result};
use crate::query::write_query;
use crate::reply::resolve_index;
use crate::toolchain::{Language, ToolchainSource, Toolchains};
use crate::version::{ToolVersion, MIN_CMAKE_VERSION};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// Runs the build tool in configure mode to regenerate reply documents.
///
/// The load sequence has a hard ordering dependency (write query ->
/// regenerate -> read replies), and tests swap in a stub so no real build
/// tool is needed.
pub trait ConfigureRunner {
    fn configure(&self, cmake: &Path, build_root: &Path) -> std::io::Result<ExitStatus>;
}

/// Default runner: blocking `cmake <buildRoot>` invocation. No timeout or
/// cancellation; a hang here blocks the load.
pub struct CmakeConfigure;

impl ConfigureRunner for CmakeConfigure {
    fn configure(&self, cmake: &Path, build_root: &Path) -> std::io::Result<ExitStatus> {
        tracing::info!(cmake = %cmake.display(), build = %build_root.display(), "regenerating File API replies");
        Command::new(cmake)
            .arg(build_root)
            .current_dir(build_root)
            .status()
    }
}

/// Everything loaded from one build directory's metadata.
#[derive(Debug)]
struct Model {
    cmake_path: PathBuf,
    cmake_version: ToolVersion,
    cache: CacheModel,
    codemodel: Codemodel,
    toolchains: Toolchains,
}

/// A File API session over one build directory.
///
/// The session starts unloaded; [`ApiSession::load_api`] is the single
/// transition to the loaded state and must succeed before any query. Load
/// either fully succeeds or leaves the session unloaded; no partial model is
/// kept.
pub struct ApiSession {
    runner: Box<dyn ConfigureRunner>,
    model: Option<Model>,
}

impl ApiSession {
    /// Create a session backed by a real `cmake` configure run.
    pub fn new() -> Self {
        Self::with_runner(Box::new(CmakeConfigure))
    }

    /// Create a session with a custom configure runner.
    pub fn with_runner(runner: Box<dyn ConfigureRunner>) -> Self {
        Self {
            runner,
            model: None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// Load the File API model for `build_root`. Must be called exactly
    /// once per session; a second call fails with
    /// [`ApiError::AlreadyLoaded`].
    ///
    /// Validates the metadata directory, reads the existing index for the
    /// build-tool path and version, writes the query, triggers a configure
    /// run to populate fresh replies, then loads cache + codemodel +
    /// toolchains (or the cache fallback).
    pub fn load_api(&mut self, build_root: &Path) -> Result<()> {
        if self.model.is_some() {
            return Err(ApiError::AlreadyLoaded);
        }
        let api_dir = build_root.join(".cmake").join("api").join("v1");
        if !api_dir.is_dir() {
            return Err(ApiError::BuildDirNotFound(api_dir));
        }

        let index = resolve_index(&api_dir)?;
        let cmake_path = index.cmake.paths.cmake.clone();
        let cmake_version: ToolVersion =
            index.cmake.version.string.parse().map_err(|_| {
                ApiError::ReplyParseError {
                    path: "index".to_string(),
                    reason: format!("unparsable cmake version {:?}", index.cmake.version.string),
                }
            })?;
        if cmake_version < MIN_CMAKE_VERSION {
            return Err(ApiError::UnsupportedVersion {
                found: cmake_version,
                minimum: MIN_CMAKE_VERSION,
            });
        }

        write_query(&api_dir, cmake_version)?;

        let status = self
            .runner
            .configure(&cmake_path, build_root)
            .map_err(|e| ApiError::ConfigureFailed(e.to_string()))?;
        if !status.success() {
            return Err(ApiError::ConfigureFailed(status.to_string()));
        }

        // Re-read the index: the configure run rewrote it with the responses
        // to our query.
        let index = resolve_index(&api_dir)?;
        let reply_dir = api_dir.join("reply");

        let cache_ref = index
            .response("cache")
            .ok_or_else(|| ApiError::ReplyNotFound(reply_dir.join("cache")))?;
        let cache = CacheModel::load(&reply_dir.join(cache_ref.json_file))?;

        let codemodel_ref = index
            .response("codemodel")
            .ok_or_else(|| ApiError::ReplyNotFound(reply_dir.join("codemodel")))?;
        let codemodel = Codemodel::load(&reply_dir.join(codemodel_ref.json_file), &reply_dir)?;

        let toolchains_path = index
            .response("toolchains")
            .map(|r| reply_dir.join(r.json_file));
        let toolchains = Toolchains::resolve(toolchains_path.as_deref(), &cache)?;

        self.model = Some(Model {
            cmake_path,
            cmake_version,
            cache,
            codemodel,
            toolchains,
        });
        Ok(())
    }

    /// The build-tool executable found in the index.
    pub fn cmake_path(&self) -> Result<&Path> {
        Ok(&self.loaded()?.cmake_path)
    }

    /// The build-tool version found in the index.
    pub fn cmake_version(&self) -> Result<ToolVersion> {
        Ok(self.loaded()?.cmake_version)
    }

    /// Which stage resolved the toolchains.
    pub fn toolchain_source(&self) -> Result<ToolchainSource> {
        Ok(self.loaded()?.toolchains.source)
    }

    /// The resolved compiler for one language, if any.
    pub fn compiler(&self, language: Language) -> Result<Option<&crate::toolchain::CompilerInfo>> {
        Ok(self.loaded()?.toolchains.get(language))
    }

    /// One cache variable's value.
    pub fn cache_variable(&self, name: &str) -> Result<Option<&str>> {
        Ok(self.loaded()?.cache.get(name))
    }

    /// Iterate the synthesized compile commands.
    ///
    /// Lazy and non-restartable: per-target documents are read as the cursor
    /// reaches them, and one command is produced per (group, source-index)
    /// pair in metadata order. Groups whose language has no resolved
    /// compiler are skipped.
    pub fn compile_commands(&self, options: CommandOptions) -> Result<CompileCommandIter<'_>> {
        let model = self.loaded()?;
        Ok(CompileCommandIter {
            model,
            options,
            target_cursor: 0,
            current: None,
        })
    }

    fn loaded(&self) -> Result<&Model> {
        self.model.as_ref().ok_or(ApiError::NotLoaded)
    }
}

impl Default for ApiSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull iterator over synthesized compile commands.
///
/// Backed by three nested cursors (target, group, source); the full command
/// list is never materialized.
#[derive(Debug)]
pub struct CompileCommandIter<'a> {
    model: &'a Model,
    options: CommandOptions,
    target_cursor: usize,
    current: Option<TargetCursor>,
}

#[derive(Debug)]
struct TargetCursor {
    doc: TargetDocument,
    group: usize,
    source: usize,
}

impl<'a> CompileCommandIter<'a> {
    fn next_in_current(&mut self) -> Option<Result<CompileCommand<'a>>> {
        let model = self.model;
        let state = self.current.as_mut()?;

        while state.group < state.doc.compile_groups.len() {
            let group = &state.doc.compile_groups[state.group];

            let compiler = Language::from_tag(&group.language)
                .and_then(|lang| model.toolchains.get(lang));
            let Some(compiler) = compiler else {
                tracing::debug!(
                    target = %state.doc.name,
                    language = %group.language,
                    "skipping compile group with no resolved compiler"
                );
                state.group += 1;
                state.source = 0;
                continue;
            };

            if let Some(&index) = group.source_indexes.get(state.source) {
                state.source += 1;
                let source = match state.doc.source_path(index) {
                    Ok(path) => path,
                    Err(e) => return Some(Err(e)),
                };
                let source = if source.is_absolute() {
                    source.to_path_buf()
                } else {
                    model.codemodel.source_root.join(source)
                };
                let args = synthesize_arguments(group, compiler, self.options);
                return Some(Ok(CompileCommand {
                    source,
                    arguments: join_arguments(&args),
                    compiler,
                }));
            }

            state.group += 1;
            state.source = 0;
        }

        self.current = None;
        None
    }
}

impl<'a> Iterator for CompileCommandIter<'a> {
    type Item = Result<CompileCommand<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.next_in_current() {
                return Some(item);
            }

            let target = self.model.codemodel.targets.get(self.target_cursor)?;
            self.target_cursor += 1;
            match load_target(target) {
                Ok(doc) => {
                    self.current = Some(TargetCursor {
                        doc,
                        group: 0,
                        source: 0,
                    });
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopConfigure;

    impl ConfigureRunner for NoopConfigure {
        fn configure(&self, _cmake: &Path, _build_root: &Path) -> std::io::Result<ExitStatus> {
            // Cheapest portable way to obtain a successful ExitStatus.
            Command::new("true")
                .status()
                .or_else(|_| Command::new("cmd").args(["/C", "exit 0"]).status())
        }
    }

    #[test]
    fn test_missing_api_dir_leaves_session_unloaded() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = ApiSession::with_runner(Box::new(NoopConfigure));

        let err = session.load_api(dir.path()).unwrap_err();
        assert!(matches!(err, ApiError::BuildDirNotFound(_)));
        assert!(!session.is_loaded());

        let err = session.compile_commands(CommandOptions::default()).unwrap_err();
        assert!(matches!(err, ApiError::NotLoaded));
    }

    #[test]
    fn test_queries_before_load_fail() {
        let session = ApiSession::with_runner(Box::new(NoopConfigure));
        assert!(matches!(session.cmake_version(), Err(ApiError::NotLoaded)));
        assert!(matches!(session.cmake_path(), Err(ApiError::NotLoaded)));
    }
}
