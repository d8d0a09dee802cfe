//! Artifact enumeration.
//!
//! The scanner walks the literal directory prefix of each configured glob
//! pattern and matches every file's root-relative, forward-slash path against
//! the pattern. A prefix directory that does not exist contributes nothing; a
//! directory that exists but cannot be read stops the scan.
//!
//! # Pattern Syntax
//!
//! - `*` matches within a single path component
//! - `**/` matches zero or more directories
//! - `?` and `[a-z]` match single characters
//!
//! Symlinks are not followed.

use anyhow::Result;
use glob::{MatchOptions, Pattern};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::config::SyncConfig;
use crate::constants::ARTIFACT_EXTENSIONS;
use crate::core::SyncError;
use crate::utils::fs::to_forward_slash;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A compiled pattern and the directory its matches live under.
#[derive(Debug, Clone)]
struct PatternMatcher {
    pattern: Pattern,
    original: String,
    base: String,
}

impl PatternMatcher {
    fn new(pattern: &str) -> Result<Self, SyncError> {
        let compiled = Pattern::new(pattern).map_err(|e| SyncError::InvalidGlobPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            pattern: compiled,
            original: pattern.to_string(),
            base: literal_prefix(pattern),
        })
    }

    fn matches(&self, relative: &str) -> bool {
        self.pattern.matches_with(relative, MATCH_OPTIONS)
    }
}

/// Directory part of `pattern` before the first glob component.
fn literal_prefix(pattern: &str) -> String {
    let mut segments: Vec<&str> = pattern.split('/').collect();
    segments.pop();
    segments
        .into_iter()
        .take_while(|segment| !segment.contains(['*', '?', '[', ']', '{', '}']))
        .collect::<Vec<_>>()
        .join("/")
}

/// Enumerates artifact files under a repository root.
#[derive(Debug, Clone)]
pub struct ArtifactScanner {
    root: PathBuf,
    patterns: Vec<PatternMatcher>,
    exclude_files: BTreeSet<String>,
}

impl ArtifactScanner {
    /// Create a scanner for `root`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidGlobPattern`] if a pattern does not compile.
    pub fn new(root: impl Into<PathBuf>, patterns: &[String], exclude_files: &[String]) -> Result<Self> {
        let patterns = patterns.iter().map(|p| PatternMatcher::new(p)).collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            root: root.into(),
            patterns,
            exclude_files: exclude_files.iter().cloned().collect(),
        })
    }

    /// Create the scanner a configuration describes.
    pub fn from_config(root: impl Into<PathBuf>, config: &SyncConfig) -> Result<Self> {
        Self::new(root, &config.patterns, &config.exclude_files)
    }

    /// Repository root being scanned.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Enumerate every artifact path, deduplicated and sorted.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::RootUnreadable`] when a directory under a pattern
    /// prefix exists but cannot be listed.
    pub fn scan(&self) -> Result<BTreeSet<String>> {
        let mut found = BTreeSet::new();

        for matcher in &self.patterns {
            let before = found.len();
            self.scan_pattern(matcher, &mut found)?;
            debug!("Pattern '{}' added {} artifacts", matcher.original, found.len() - before);
        }

        debug!("Scanned {} artifacts under {}", found.len(), self.root.display());
        Ok(found)
    }

    fn scan_pattern(&self, matcher: &PatternMatcher, found: &mut BTreeSet<String>) -> Result<()> {
        let base = self.root.join(&matcher.base);
        match std::fs::metadata(&base) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                trace!("Pattern root {} does not exist", base.display());
                return Ok(());
            }
            Err(e) => {
                return Err(SyncError::RootUnreadable {
                    root: matcher.base.clone(),
                    reason: e.to_string(),
                }
                .into());
            }
        }

        for entry in WalkDir::new(&base).follow_links(false) {
            let entry = entry.map_err(|e| SyncError::RootUnreadable {
                root: e
                    .path()
                    .and_then(|p| p.strip_prefix(&self.root).ok())
                    .map_or_else(|| matcher.base.clone(), to_forward_slash),
                reason: e.to_string(),
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let relative = to_forward_slash(relative);

            if !self.is_candidate(&relative) || !matcher.matches(&relative) {
                continue;
            }

            trace!("Found artifact: {relative}");
            found.insert(relative);
        }

        Ok(())
    }

    fn is_candidate(&self, relative: &str) -> bool {
        let file_name = relative.rsplit('/').next().unwrap_or(relative);
        if self.exclude_files.contains(file_name) {
            return false;
        }
        file_name
            .rsplit_once('.')
            .is_some_and(|(_, ext)| ARTIFACT_EXTENSIONS.contains(&ext))
    }
}
