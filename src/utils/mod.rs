//! Shared utilities
//!
//! - [`fs`] - atomic writes, parallel reads, canonical path helpers
//! - [`progress`] - progress bars for the read stage

pub mod fs;
pub mod progress;

pub use fs::{atomic_write, read_files_parallel, safe_write, to_forward_slash};
pub use progress::ProgressBar;
