//! Rewrite the generated manifest sections.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use tracing::info;

use super::{CommandContext, OutputFormat};
use crate::report::SyncSummary;

/// Scan the repository and rewrite `[agents]` and `[commands]`.
#[derive(Args, Debug)]
pub struct SyncCommand {
    /// Show what would change without writing the manifest.
    #[arg(long)]
    pub(crate) dry_run: bool,

    /// Output format for the summary.
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
}

impl SyncCommand {
    /// Run the pipeline and write the manifest unless this is a dry run.
    pub async fn execute(self, context: &CommandContext) -> Result<()> {
        let pipeline = context.pipeline().await?;
        let outcome = pipeline.plan().await?;

        let written = if self.dry_run {
            info!("Dry run: {} left untouched", outcome.manifest.path.display());
            false
        } else {
            outcome.manifest.write()?
        };

        let summary = SyncSummary::from_scan(&outcome.scan).with_manifest(
            &pipeline.config().manifest.path,
            &outcome.manifest,
            &outcome.changes,
            written,
        );
        self.format.print(&summary)?;

        if self.dry_run && outcome.manifest.changed() && self.format == OutputFormat::Text {
            println!("{}", "Dry run: the manifest was not written".yellow());
        }
        Ok(())
    }
}
