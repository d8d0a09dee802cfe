//! Print the scan summary.

use anyhow::Result;
use clap::Args;

use super::{CommandContext, OutputFormat};
use crate::report::SyncSummary;

/// Scan the repository and report what would be generated.
#[derive(Args, Debug)]
pub struct ScanCommand {
    /// Output format for the summary.
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
}

impl ScanCommand {
    /// Run the scan stages only.
    pub async fn execute(self, context: &CommandContext) -> Result<()> {
        let scan = context.pipeline().await?.scan().await?;
        self.format.print(&SyncSummary::from_scan(&scan))
    }
}
