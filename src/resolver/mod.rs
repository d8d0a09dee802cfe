//! Dependency resolution and the top-level set.
//!
//! [`resolve_dependency`] turns a declared path into a canonical one and
//! [`DependencyGraph`] folds every artifact's edges into the referenced set
//! the top-level computation needs.

pub mod graph;
pub mod path;

pub use graph::{DependencyGraph, bucket_top_level};
pub use path::{dependencies_of, normalize, resolve_dependency};
