//! agpm-sync CLI entry point
//!
//! Parses arguments, runs the selected command and turns failures into a
//! coloured message with a suggestion.
//!
//! - `sync` - Rewrite the generated manifest sections
//! - `check` - Exit with status 1 when the manifest is out of date
//! - `scan` - Print the scan summary

use agpm_sync::cli;
use agpm_sync::core::user_friendly_error;
use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            user_friendly_error(e).display();
            std::process::exit(1);
        }
    }
}
