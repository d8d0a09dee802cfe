//! Metadata extraction from artifact files.
//!
//! This is the only part of the crate that looks at file content for
//! structure; every later stage works on the typed records defined here.

pub mod dependency;
pub mod extractor;

pub use dependency::{AgpmSection, ArtifactMetadata, DependencyCategory, DependencySpec};
pub use extractor::{Extraction, FrontmatterExtractor};
