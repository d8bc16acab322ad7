use clap::{Parser, Subcommand};
use cmscan_analyze::{Analyzer, RunConfig};
use cmscan_api::{ApiSession, CommandOptions};
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cmscan")]
#[command(author, version, about = "MSVC static analysis over CMake File API metadata")]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run code analysis over every reconstructed compile command
    Analyze {
        /// CMake build directory (must have been configured at least once)
        build_dir: PathBuf,

        /// Run configuration file (cmscan.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Where SARIF logs are written (overrides the config file)
        #[arg(long)]
        results_dir: Option<PathBuf>,

        /// Ruleset name or path (overrides the config file)
        #[arg(long)]
        ruleset: Option<String>,

        /// Mark include directories as external where supported
        #[arg(long)]
        external_includes: bool,
    },

    /// Print the reconstructed compile commands without running the compiler
    Commands {
        /// CMake build directory
        build_dir: PathBuf,

        /// Mark include directories as external where supported
        #[arg(long)]
        external_includes: bool,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    match cli.command {
        Commands::Analyze {
            build_dir,
            config,
            results_dir,
            ruleset,
            external_includes,
        } => {
            let mut run_config = match config {
                Some(path) => RunConfig::from_file(&path).into_diagnostic()?,
                None => RunConfig::default(),
            };
            if let Some(results_dir) = results_dir {
                run_config.analyze.results_dir = Some(results_dir);
            }
            if let Some(ruleset) = ruleset {
                run_config.analyze.ruleset = Some(ruleset);
            }
            if external_includes {
                run_config.analyze.external_includes = true;
            }

            let summary = Analyzer::new(run_config.analyze)
                .run(&build_dir)
                .into_diagnostic()?;
            println!(
                "Analyzed {} source file(s), skipped {}",
                summary.analyzed, summary.skipped
            );
        }

        Commands::Commands {
            build_dir,
            external_includes,
        } => {
            let mut session = ApiSession::new();
            session.load_api(&build_dir).into_diagnostic()?;

            let options = CommandOptions { external_includes };
            for command in session.compile_commands(options).into_diagnostic()? {
                let command = command.into_diagnostic()?;
                println!(
                    "{} {} {}",
                    command.compiler.path.display(),
                    command.arguments,
                    command.source.display()
                );
            }
        }
    }

    Ok(())
}
