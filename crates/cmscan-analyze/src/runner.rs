//! The analysis run: one compiler invocation per reconstructed compile
//! command, producing one SARIF log per source.

use crate::config::AnalyzeConfig;
use crate::error::{AnalyzeError, Result};
use crate::plugin::find_espx_engine;
use crate::results::{prepare_results_dir, sarif_log_path};
use crate::ruleset::resolve_ruleset;
use cmscan_api::{escape_argument, ApiSession, CommandOptions, CompileCommand};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// Counts for one completed run.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunSummary {
    pub analyzed: usize,
    pub skipped: usize,
}

/// Drives MSVC code analysis over a loaded File API session.
pub struct Analyzer {
    config: AnalyzeConfig,
}

impl Analyzer {
    pub fn new(config: AnalyzeConfig) -> Self {
        Self { config }
    }

    /// Load the build directory's metadata and analyze every compile
    /// command.
    pub fn run(&self, build_root: &Path) -> Result<RunSummary> {
        let mut session = ApiSession::new();
        session.load_api(build_root)?;
        self.run_with_session(&session, build_root)
    }

    /// Analyze using an already-loaded session. Iteration is pull-based, so
    /// each compiler process finishes before the next command is
    /// synthesized.
    pub fn run_with_session(
        &self,
        session: &ApiSession,
        build_root: &Path,
    ) -> Result<RunSummary> {
        let results_dir = self
            .config
            .results_dir
            .clone()
            .unwrap_or_else(|| build_root.join("analysis"));
        prepare_results_dir(&results_dir)?;

        let ruleset = self
            .config
            .ruleset
            .as_deref()
            .and_then(|name| resolve_ruleset(&self.config.ruleset_dirs, name));

        let options = CommandOptions {
            external_includes: self.config.external_includes,
        };

        let mut plugins: HashMap<PathBuf, PathBuf> = HashMap::new();
        let mut summary = RunSummary::default();

        for (ordinal, item) in session.compile_commands(options)?.enumerate() {
            let command = item?;
            if self.is_ignored(&command.source) {
                tracing::debug!(source = %command.source.display(), "skipping ignored source");
                summary.skipped += 1;
                continue;
            }

            let plugin = match plugins.get(&command.compiler.path) {
                Some(plugin) => plugin.clone(),
                None => {
                    let plugin = find_espx_engine(&command.compiler.path)?;
                    plugins.insert(command.compiler.path.clone(), plugin.clone());
                    plugin
                }
            };

            let log = sarif_log_path(&results_dir, &command.source, ordinal);
            tracing::info!(source = %command.source.display(), log = %log.display(), "analyzing");

            let status = self.spawn_compiler(&command, &plugin, &log, ruleset.as_deref())?;
            if !status.success() {
                return Err(AnalyzeError::AnalysisFailed {
                    file: command.source,
                    status: status.to_string(),
                });
            }
            summary.analyzed += 1;
        }

        tracing::info!(
            analyzed = summary.analyzed,
            skipped = summary.skipped,
            "analysis run complete"
        );
        Ok(summary)
    }

    fn is_ignored(&self, source: &Path) -> bool {
        self.config
            .ignored_paths
            .iter()
            .any(|prefix| source.starts_with(prefix))
    }

    fn spawn_compiler(
        &self,
        command: &CompileCommand<'_>,
        plugin: &Path,
        log: &Path,
        ruleset: Option<&Path>,
    ) -> Result<ExitStatus> {
        let mut child = Command::new(&command.compiler.path);
        child.args(analysis_arguments(plugin, log, ruleset));

        if !self.config.ignored_paths.is_empty() {
            child.env("CAExcludePath", join_exclude_paths(&self.config.ignored_paths));
        }

        // The synthesized string is already escaped for the MSVC command
        // line, so it must reach the child unsplit and unquoted.
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            child.raw_arg(&command.arguments);
        }
        #[cfg(not(windows))]
        child.arg(&command.arguments);

        child.arg(&command.source);
        child.status().map_err(|e| AnalyzeError::CompilerLaunch {
            compiler: command.compiler.path.clone(),
            reason: e.to_string(),
        })
    }
}

/// The analysis flags placed before the reconstructed compile arguments.
fn analysis_arguments(plugin: &Path, log: &Path, ruleset: Option<&Path>) -> Vec<String> {
    let mut args = vec![
        "/analyze:quiet".to_string(),
        "/analyze:log:format:sarif".to_string(),
        escape_argument(&format!("/analyze:log{}", log.display())),
        escape_argument(&format!("/analyze:plugin{}", plugin.display())),
    ];
    if let Some(ruleset) = ruleset {
        args.push(escape_argument(&format!(
            "/analyze:ruleset{}",
            ruleset.display()
        )));
    }
    args
}

/// `CAExcludePath` is a semicolon-separated prefix list.
fn join_exclude_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(";")
}
