//! Verify the manifest is current without writing it.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::CommandContext;
use crate::core::SyncError;
use crate::utils::fs::to_forward_slash;

/// Fail when synchronizing would change the manifest.
#[derive(Args, Debug)]
pub struct CheckCommand {}

impl CheckCommand {
    /// Plan a sync and compare it with the file on disk.
    ///
    /// # Errors
    ///
    /// [`SyncError::ManifestOutOfDate`] when the manifest differs from the
    /// synchronized content; the added and removed entries are listed first.
    pub async fn execute(self, context: &CommandContext) -> Result<()> {
        let pipeline = context.pipeline().await?;
        let outcome = pipeline.plan().await?;
        let path = to_forward_slash(&pipeline.config().manifest.path);

        if !outcome.manifest.changed() {
            println!("{} {path} is up to date", "✓".green());
            return Ok(());
        }

        for key in &outcome.changes.added {
            eprintln!("  {} {key}", "+".green());
        }
        for key in &outcome.changes.removed {
            eprintln!("  {} {key}", "-".red());
        }
        Err(SyncError::ManifestOutOfDate {
            path,
        }
        .into())
    }
}
