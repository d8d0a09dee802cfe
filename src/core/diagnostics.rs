//! Non-fatal findings collected during a sync run.
//!
//! Each stage returns the diagnostics it produced alongside its output and
//! the pipeline merges them; nothing is accumulated in shared state. All of
//! them end up in the final summary.

use serde::Serialize;
use std::fmt;

/// A single non-fatal finding.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Diagnostic {
    /// A metadata block was found but could not be parsed. The file still
    /// counts as an artifact, with no dependencies.
    MalformedMetadata {
        /// Artifact path.
        path: String,
        /// Parser message.
        reason: String,
    },
    /// A dependency path contains a template placeholder and was left out of
    /// the referenced set.
    UnresolvablePath {
        /// Declaring artifact.
        path: String,
        /// Raw dependency path.
        dependency: String,
    },
    /// A resolved dependency points at a path that is not a scanned artifact.
    DanglingReference {
        /// Declaring artifact.
        path: String,
        /// Canonical target.
        target: String,
    },
    /// `agpm.version` is not a valid semantic version.
    InvalidVersion {
        /// Artifact path.
        path: String,
        /// The declared version string.
        version: String,
    },
}

impl Diagnostic {
    /// Short label for the diagnostic class.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MalformedMetadata { .. } => "malformed metadata",
            Self::UnresolvablePath { .. } => "unresolvable path",
            Self::DanglingReference { .. } => "dangling reference",
            Self::InvalidVersion { .. } => "invalid version",
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedMetadata { path, reason } => write!(f, "{path}: {reason}"),
            Self::UnresolvablePath { path, dependency } => {
                write!(f, "{path}: '{dependency}' contains a template placeholder")
            }
            Self::DanglingReference { path, target } => {
                write!(f, "{path}: '{target}' does not exist")
            }
            Self::InvalidVersion { path, version } => {
                write!(f, "{path}: '{version}' is not a semantic version")
            }
        }
    }
}

/// Ordered, de-duplicated collection of diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    /// Empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    /// Append every diagnostic of `other`.
    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    /// Sort and remove duplicates so reports are deterministic.
    #[must_use]
    pub fn finish(mut self) -> Self {
        self.0.sort();
        self.0.dedup();
        self
    }

    /// Number of diagnostics.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in recorded order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }
}

impl FromIterator<Diagnostic> for Diagnostics {
    fn from_iter<I: IntoIterator<Item = Diagnostic>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
