//! Test utilities for agpm-sync
//!
//! Helpers shared by unit tests and the integration tests under `tests/`:
//! - [`RepoFixture`] builds a throwaway resource repository on disk
//! - [`ManifestFixture`] provides sample manifests
//! - [`init_test_logging`] wires `tracing` output into the test harness
//!
//! # Example
//!
//! ```rust,no_run
//! use agpm_sync::test_utils::RepoFixture;
//!
//! let repo = RepoFixture::new().unwrap();
//! repo.add_file("claude-code/agents/x.md", "# X\n").unwrap();
//! assert!(repo.file_exists("claude-code/agents/x.md"));
//! ```

pub mod fixtures;

pub use fixtures::{ManifestFixture, RepoFixture};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests, once per process.
///
/// Uses `level` when given, otherwise `RUST_LOG`; with neither, logging
/// stays off.
///
/// ```bash
/// RUST_LOG=agpm_sync=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
