//! Command-line interface for agpm-sync.
//!
//! # Available Commands
//!
//! - `sync` - Scan the repository and rewrite the generated manifest sections
//! - `check` - Fail when the manifest is out of date (for CI)
//! - `scan` - Print the scan summary without touching the manifest
//!
//! # Global Options
//!
//! All commands support these global options:
//! - `--verbose` - Enable debug output
//! - `--quiet` - Suppress all output except errors
//! - `--no-progress` - Disable progress bars
//! - `--root` - Repository root (defaults to the current directory)
//! - `--config` - Path to a configuration file other than `<root>/agpm-sync.toml`
//!
//! # Example
//!
//! ```bash
//! # Regenerate [agents] and [commands] in examples/deps/agpm.toml
//! agpm-sync sync
//!
//! # Preview the changes as JSON
//! agpm-sync sync --dry-run --format json
//!
//! # CI gate
//! agpm-sync --quiet check
//! ```

mod check;
mod scan;
mod sync;


use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::SyncConfig;
use crate::pipeline::SyncPipeline;
use crate::report::SyncSummary;

/// Output format for commands that print a summary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Print `summary` to stdout in this format.
    pub fn print(self, summary: &SyncSummary) -> Result<()> {
        match self {
            Self::Text => print!("{}", summary.render_text()),
            Self::Json => println!("{}", summary.render_json()?),
        }
        Ok(())
    }
}

/// Keeps an agpm manifest in sync with a resource repository.
#[derive(Parser, Debug)]
#[command(
    name = "agpm-sync",
    about = "Keep agpm.toml in sync with the top-level artifacts of a resource repository",
    version,
    author
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (equivalent to `RUST_LOG=debug`).
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all output except errors.
    ///
    /// Summaries are still printed; only logging and progress bars are
    /// silenced.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable progress bars.
    #[arg(long, global = true)]
    no_progress: bool,

    /// Repository root to scan.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Configuration file to use instead of `<root>/agpm-sync.toml`.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan the repository and rewrite the generated manifest sections.
    Sync(sync::SyncCommand),

    /// Exit with an error when the manifest is out of date.
    Check(check::CheckCommand),

    /// Print the scan summary without touching the manifest.
    Scan(scan::ScanCommand),
}

/// Settings every command runs with.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Repository root.
    pub root: PathBuf,
    /// Explicit configuration file.
    pub config_path: Option<PathBuf>,
    /// Whether progress bars may be drawn.
    pub show_progress: bool,
}

impl CommandContext {
    /// Load the configuration and build the pipeline.
    pub async fn pipeline(&self) -> Result<SyncPipeline> {
        let config = SyncConfig::load(&self.root, self.config_path.as_deref()).await?;
        Ok(SyncPipeline::new(&self.root, config).with_progress(self.show_progress))
    }
}

impl Cli {
    /// Initialize logging and run the selected command.
    pub async fn execute(self) -> Result<()> {
        self.init_logging();
        let context = self.context();

        match self.command {
            Commands::Sync(cmd) => cmd.execute(&context).await,
            Commands::Check(cmd) => cmd.execute(&context).await,
            Commands::Scan(cmd) => cmd.execute(&context).await,
        }
    }

    /// Command context derived from the global flags.
    pub fn context(&self) -> CommandContext {
        CommandContext {
            root: self.root.clone(),
            config_path: self.config.clone(),
            show_progress: !self.no_progress && !self.quiet,
        }
    }

    /// Log filter for the global flags.
    ///
    /// `--verbose` and `--quiet` win over `RUST_LOG`.
    fn log_filter(&self) -> EnvFilter {
        if self.verbose {
            EnvFilter::new("debug")
        } else if self.quiet {
            EnvFilter::new("error")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
        }
    }

    fn init_logging(&self) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(self.log_filter())
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}
