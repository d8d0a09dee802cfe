//! agpm-sync - keeps an agpm manifest in sync with a resource repository
//!
//! A resource repository holds prompt artifacts for two tools (`claude-code/`
//! and `opencode/`) plus a shared library tree (`snippets/`). Artifacts
//! declare dependencies on each other in their frontmatter. An artifact that
//! nothing else references is *top-level*: it is what users install, so it
//! is what the repository's example manifest must list.
//!
//! # Pipeline
//!
//! ```text
//! scan -> read + extract -> resolve -> graph -> top-level -> expand -> synchronize
//! ```
//!
//! 1. [`scanner`] enumerates artifact files by glob pattern
//! 2. [`metadata`] extracts YAML frontmatter or JSON dependency fields
//! 3. [`resolver`] canonicalizes dependency paths and builds the reference graph
//! 4. [`templating`] discovers the values of the template axes (languages, frameworks)
//! 5. [`variants`] expands templated artifacts into one entry per axis combination
//! 6. [`manifest`] regenerates the owned sections of `agpm.toml`, leaving
//!    everything else byte-for-byte intact
//!
//! [`pipeline::SyncPipeline`] drives the stages and [`report::SyncSummary`]
//! describes the result.
//!
//! # Example
//!
//! ```rust,no_run
//! use agpm_sync::config::SyncConfig;
//! use agpm_sync::pipeline::SyncPipeline;
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let root = Path::new(".");
//! let config = SyncConfig::load(root, None).await?;
//! let (outcome, written) = SyncPipeline::new(root, config).sync().await?;
//! println!("{} top-level buckets, written: {written}", outcome.scan.entries.len());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod manifest;
pub mod metadata;
pub mod pipeline;
pub mod report;
pub mod resolver;
pub mod scanner;
pub mod templating;
pub mod utils;
pub mod variants;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
