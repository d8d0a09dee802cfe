//! Core types for agpm-sync
//!
//! This module holds the data model every pipeline stage shares and the
//! error types that can stop a run.
//!
//! ## Artifact Model
//! - [`Artifact`] - one scanned file, identified by its canonical path
//! - [`ToolCategory`] / [`ArtifactKind`] - the `(tool, type)` classification
//! - [`Dependency`] - an edge declared in an artifact's frontmatter
//!
//! ## Error Management
//! - [`SyncError`] - fatal failures
//! - [`ErrorContext`] / [`user_friendly_error`] - CLI presentation
//! - [`Diagnostic`] / [`Diagnostics`] - non-fatal findings surfaced in the summary

pub mod artifact;
pub mod diagnostics;
pub mod error;

pub use artifact::{Artifact, ArtifactKind, Bucket, Dependency, ToolCategory};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::{ErrorContext, SyncError, user_friendly_error};
