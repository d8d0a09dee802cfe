//! Run summary.
//!
//! A [`SyncSummary`] is built from a [`ScanOutcome`] and, for `sync` and
//! `check`, the planned manifest update. It renders either as coloured text
//! for people or as pretty JSON for scripts:
//!
//! ```text
//! Scanned 14 artifacts (2 without metadata)
//!   Claude Code agents      5
//!   Claude Code commands    3
//!   Library other           6
//! Referenced paths: 7
//!
//! Top-level entries
//!   Claude Code agents (2)
//!     reviewer  claude-code/agents/reviewer.md  claude-code-agent-reviewer-v1.2.0
//! ```

use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::core::{ArtifactKind, Bucket, Diagnostics, ToolCategory};
use crate::manifest::{EntryChanges, ManifestUpdate};
use crate::pipeline::ScanOutcome;
use crate::utils::fs::to_forward_slash;

/// Number of scanned artifacts in one `(tool, kind)` bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketCount {
    /// Tool category.
    pub tool: ToolCategory,
    /// Artifact type.
    pub kind: ArtifactKind,
    /// Artifact count.
    pub count: usize,
}

/// One expanded top-level entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopLevelEntry {
    /// Manifest key.
    pub name: String,
    /// Artifact path.
    pub path: String,
    /// Release tag, when the artifact declares a version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_tag: Option<String>,
}

/// Top-level entries of one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketEntries {
    /// Tool category.
    pub tool: ToolCategory,
    /// Artifact type.
    pub kind: ArtifactKind,
    /// Entries sorted by name.
    pub entries: Vec<TopLevelEntry>,
}

/// A referenced path that was never scanned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingTarget {
    /// Canonical path of the missing target.
    pub target: String,
    /// Artifacts that declare it, in path order.
    pub referrers: Vec<String>,
}

/// Manifest state after planning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestStatus {
    /// Manifest path relative to the repository root.
    pub path: String,
    /// Whether the synchronized content differs from the file.
    pub changed: bool,
    /// Whether the file was written in this run.
    pub written: bool,
    /// Added and removed entry keys.
    pub changes: EntryChanges,
}

/// Everything a run reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    /// Scanned artifacts per bucket.
    pub scanned: Vec<BucketCount>,
    /// Total scanned artifacts.
    pub artifact_count: usize,
    /// Artifacts without a metadata block.
    pub missing_metadata: usize,
    /// Unique referenced paths, dangling ones included.
    pub referenced_count: usize,
    /// Expanded top-level entries per bucket.
    pub top_level: Vec<BucketEntries>,
    /// Referenced paths missing from the scan.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dangling: Vec<DanglingTarget>,
    /// Discovered axis values.
    pub axes: BTreeMap<String, Vec<String>>,
    /// Non-fatal findings.
    pub diagnostics: Diagnostics,
    /// Manifest state; absent for a plain scan.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<ManifestStatus>,
}

impl SyncSummary {
    /// Summarize a scan.
    pub fn from_scan(scan: &ScanOutcome) -> Self {
        let mut counts: BTreeMap<Bucket, usize> = BTreeMap::new();
        for artifact in scan.graph.all_artifacts() {
            *counts.entry(artifact.bucket()).or_default() += 1;
        }
        let scanned = counts
            .into_iter()
            .map(|(bucket, count)| BucketCount {
                tool: bucket.tool,
                kind: bucket.kind,
                count,
            })
            .collect();

        let top_level = scan
            .entries
            .iter()
            .map(|(bucket, entries)| BucketEntries {
                tool: bucket.tool,
                kind: bucket.kind,
                entries: entries
                    .iter()
                    .map(|entry| TopLevelEntry {
                        name: entry.name.clone(),
                        path: entry.artifact_path.clone(),
                        release_tag: scan
                            .graph
                            .artifact(&entry.artifact_path)
                            .and_then(|artifact| artifact.release_tag()),
                    })
                    .collect(),
            })
            .collect();

        let dangling = scan
            .graph
            .dangling_references()
            .into_iter()
            .map(|target| DanglingTarget {
                target: target.to_string(),
                referrers: scan.graph.referrers(target).into_iter().map(str::to_string).collect(),
            })
            .collect();

        let axes = scan
            .axes
            .iter()
            .map(|axis| (axis.name.clone(), axis.values.iter().cloned().collect()))
            .collect();

        Self {
            scanned,
            artifact_count: scan.graph.artifact_count(),
            missing_metadata: scan.missing_metadata,
            referenced_count: scan.graph.referenced_paths().len(),
            top_level,
            dangling,
            axes,
            diagnostics: scan.diagnostics.clone(),
            manifest: None,
        }
    }

    /// Attach the manifest state.
    #[must_use]
    pub fn with_manifest(
        mut self,
        relative_path: &Path,
        update: &ManifestUpdate,
        changes: &EntryChanges,
        written: bool,
    ) -> Self {
        self.manifest = Some(ManifestStatus {
            path: to_forward_slash(relative_path),
            changed: update.changed(),
            written,
            changes: changes.clone(),
        });
        self
    }

    /// Number of top-level entries across all buckets.
    pub fn top_level_count(&self) -> usize {
        self.top_level.iter().map(|bucket| bucket.entries.len()).sum()
    }

    /// Pretty JSON.
    pub fn render_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable report.
    pub fn render_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} {} artifacts ({} without metadata)",
            "Scanned".bold(),
            self.artifact_count,
            self.missing_metadata
        )?;
        for count in &self.scanned {
            let label = format!("{} {}", count.tool.display_name(), count.kind.plural());
            writeln!(f, "  {label:<24}{}", count.count)?;
        }
        writeln!(f, "Referenced paths: {}", self.referenced_count)?;

        writeln!(f)?;
        writeln!(f, "{} ({})", "Top-level entries".bold(), self.top_level_count())?;
        for bucket in &self.top_level {
            writeln!(
                f,
                "  {} {} ({})",
                bucket.tool.display_name(),
                bucket.kind.plural(),
                bucket.entries.len()
            )?;
            for entry in &bucket.entries {
                write!(f, "    {}  {}", entry.name.cyan(), entry.path)?;
                if let Some(tag) = &entry.release_tag {
                    write!(f, "  {}", tag.dimmed())?;
                }
                writeln!(f)?;
            }
        }

        if !self.axes.is_empty() {
            writeln!(f)?;
            writeln!(f, "{}", "Template axes".bold())?;
            for (name, values) in &self.axes {
                let shown = if values.is_empty() { "(none)".to_string() } else { values.join(", ") };
                writeln!(f, "  {name}: {shown}")?;
            }
        }

        if !self.dangling.is_empty() {
            writeln!(f)?;
            writeln!(f, "{} ({})", "Missing targets".yellow().bold(), self.dangling.len())?;
            for dangling in &self.dangling {
                writeln!(f, "  {}  <- {}", dangling.target.yellow(), dangling.referrers.join(", "))?;
            }
        }

        if !self.diagnostics.is_empty() {
            writeln!(f)?;
            writeln!(f, "{} ({})", "Diagnostics".yellow().bold(), self.diagnostics.len())?;
            for diagnostic in self.diagnostics.iter() {
                writeln!(f, "  {} {}: {diagnostic}", "⚠".yellow(), diagnostic.label())?;
            }
        }

        if let Some(manifest) = &self.manifest {
            writeln!(f)?;
            let state = match (manifest.changed, manifest.written) {
                (false, _) => "up to date".green().to_string(),
                (true, true) => "updated".green().to_string(),
                (true, false) => "out of date".yellow().to_string(),
            };
            writeln!(f, "{} {}: {state}", "Manifest".bold(), manifest.path)?;
            for key in &manifest.changes.added {
                writeln!(f, "  {} {key}", "+".green())?;
            }
            for key in &manifest.changes.removed {
                writeln!(f, "  {} {key}", "-".red())?;
            }
        }

        Ok(())
    }
}
