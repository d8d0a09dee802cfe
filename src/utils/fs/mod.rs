//! File system helpers shared by the pipeline stages.
//!
//! - [`atomic`]: temp-file-and-rename writes for the manifest
//! - [`parallel`]: bounded concurrent reads of artifact files
//! - [`paths`]: conversions between host paths and canonical `/` paths

pub mod atomic;
pub mod parallel;
pub mod paths;

pub use atomic::{atomic_write, safe_write};
pub use parallel::read_files_parallel;
pub use paths::{relative_path, to_forward_slash};
