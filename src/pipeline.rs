//! Stage orchestration.
//!
//! ```text
//! scan -> read + extract -> resolve -> graph -> top-level -> expand -> synchronize
//!              \-> discover axis values (concurrently with reads)
//! ```
//!
//! Each stage consumes the previous stage's output by value or reference and
//! returns new values; diagnostics are threaded through explicitly. Only the
//! reads and axis discovery run concurrently; everything after them works on
//! fully materialized, path-sorted collections, so results never depend on
//! scheduling.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::SyncConfig;
use crate::core::{Artifact, ArtifactKind, Bucket, Diagnostic, Diagnostics, ToolCategory};
use crate::manifest::{EntryChanges, ManifestSynchronizer, ManifestUpdate};
use crate::metadata::{Extraction, FrontmatterExtractor};
use crate::resolver::{DependencyGraph, bucket_top_level, dependencies_of};
use crate::scanner::ArtifactScanner;
use crate::templating::{DiscoveredAxes, discover_axes, placeholders_in};
use crate::utils::fs::read_files_parallel;
use crate::utils::progress::ProgressBar;
use crate::variants::{VariantEntry, VariantExpander};

/// One artifact built from its file, with the diagnostics it produced.
#[derive(Debug, Clone)]
pub struct LoadedArtifact {
    /// The artifact.
    pub artifact: Artifact,
    /// Findings for this file.
    pub diagnostics: Diagnostics,
    /// True when the file had no metadata block at all.
    pub missing_metadata: bool,
}

/// Build an [`Artifact`] from a scanned path and its content.
///
/// Returns `None` when the path is outside every tool directory.
pub fn load_artifact(
    path: String,
    content: &str,
    extractor: &FrontmatterExtractor,
    library_prefix: &str,
) -> Option<LoadedArtifact> {
    let Some(tool) = ToolCategory::from_path(&path, library_prefix) else {
        warn!("Skipping {path}: not under a known tool directory");
        return None;
    };

    let mut diagnostics = Diagnostics::new();
    let (metadata, missing_metadata) = match extractor.extract(&path, content) {
        Extraction::Missing => (None, true),
        Extraction::Parsed(metadata) => (Some(metadata), false),
        Extraction::Malformed(reason) => {
            debug!("Malformed metadata in {path}: {reason}");
            diagnostics.push(Diagnostic::MalformedMetadata {
                path: path.clone(),
                reason,
            });
            (None, false)
        }
    };

    if let Some(version) = metadata.as_ref().and_then(|m| m.invalid_version()) {
        diagnostics.push(Diagnostic::InvalidVersion {
            path: path.clone(),
            version: version.to_string(),
        });
    }

    let dependencies = metadata.as_ref().map(|m| dependencies_of(&path, m)).unwrap_or_default();

    let mut placeholders = placeholders_in(content);
    for dependency in &dependencies {
        placeholders.extend(placeholders_in(&dependency.raw_path));
    }

    Some(LoadedArtifact {
        artifact: Artifact {
            kind: ArtifactKind::from_path(&path),
            path,
            tool,
            metadata,
            dependencies,
            placeholders,
        },
        diagnostics,
        missing_metadata,
    })
}

/// Everything computed from the repository, before the manifest is touched.
#[derive(Debug)]
pub struct ScanOutcome {
    /// Artifacts and references.
    pub graph: DependencyGraph,
    /// Discovered axis values.
    pub axes: DiscoveredAxes,
    /// Expanded top-level entries per bucket, sorted by name.
    pub entries: BTreeMap<Bucket, Vec<VariantEntry>>,
    /// Every non-fatal finding, sorted.
    pub diagnostics: Diagnostics,
    /// Artifacts without a metadata block.
    pub missing_metadata: usize,
}

/// A full run: the scan plus the computed manifest.
#[derive(Debug)]
pub struct SyncOutcome {
    /// Scan results.
    pub scan: ScanOutcome,
    /// Manifest content on disk and after synchronization.
    pub manifest: ManifestUpdate,
    /// Entries added to or removed from the regenerated sections.
    pub changes: EntryChanges,
}

/// Runs the stages against one repository.
#[derive(Debug, Clone)]
pub struct SyncPipeline {
    root: PathBuf,
    config: SyncConfig,
    show_progress: bool,
}

impl SyncPipeline {
    /// Pipeline for the repository at `root`.
    pub fn new(root: impl Into<PathBuf>, config: SyncConfig) -> Self {
        Self {
            root: root.into(),
            config,
            show_progress: false,
        }
    }

    /// Show a progress bar while reading artifacts.
    #[must_use]
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Repository root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Active configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Scan the repository and expand its top-level artifacts.
    pub async fn scan(&self) -> Result<ScanOutcome> {
        let scanner = ArtifactScanner::from_config(&self.root, &self.config)?;
        let paths: Vec<String> = tokio::task::spawn_blocking(move || scanner.scan())
            .await
            .context("Artifact scan task panicked")??
            .into_iter()
            .collect();
        info!("Found {} artifact files", paths.len());

        let progress = ProgressBar::new(paths.len() as u64, !self.show_progress);
        progress.set_prefix("Reading artifacts");

        let (contents, axes) = tokio::join!(
            read_files_parallel(&self.root, &paths, self.config.effective_parallelism(), Some(&progress)),
            discover_axes(&self.root, &self.config.axes),
        );
        progress.finish_and_clear();
        let contents = contents?;
        let axes = axes?;

        let extractor = FrontmatterExtractor::new(self.config.frontmatter_max_lines);
        let mut diagnostics = Diagnostics::new();
        let mut missing_metadata = 0;
        let mut artifacts = Vec::with_capacity(contents.len());
        for (path, content) in contents {
            let Some(loaded) = load_artifact(path, &content, &extractor, &self.config.library_prefix)
            else {
                continue;
            };
            diagnostics.extend(loaded.diagnostics);
            missing_metadata += usize::from(loaded.missing_metadata);
            artifacts.push(loaded.artifact);
        }

        let (graph, graph_diagnostics) = DependencyGraph::build(artifacts);
        diagnostics.extend(graph_diagnostics);

        let top_level = graph.top_level();
        debug!(
            "{} artifacts, {} referenced paths, {} top-level",
            graph.artifact_count(),
            graph.referenced_paths().len(),
            top_level.len()
        );

        let buckets = bucket_top_level(top_level);
        let entries = VariantExpander::from_config(&self.config).expand_all(&buckets, &axes);
        let diagnostics = diagnostics.finish();
        if !diagnostics.is_empty() {
            info!("{} diagnostics recorded", diagnostics.len());
        }

        Ok(ScanOutcome {
            graph,
            axes,
            entries,
            diagnostics,
            missing_metadata,
        })
    }

    /// Scan and compute the synchronized manifest without writing it.
    pub async fn plan(&self) -> Result<SyncOutcome> {
        let scan = self.scan().await?;
        let synchronizer = ManifestSynchronizer::from_config(&self.config);
        let manifest = synchronizer
            .plan(&self.root, &scan.entries)
            .await
            .with_context(|| format!("Failed to synchronize {}", synchronizer.path().display()))?;
        let changes = manifest.entry_changes(synchronizer.sections());

        Ok(SyncOutcome {
            scan,
            manifest,
            changes,
        })
    }

    /// Scan, synchronize and write the manifest when it changed.
    ///
    /// Returns the outcome and whether the file was written.
    pub async fn sync(&self) -> Result<(SyncOutcome, bool)> {
        let outcome = self.plan().await?;
        let written = outcome.manifest.write()?;
        Ok((outcome, written))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::RepoFixture;

    #[test]
    fn test_load_artifact_collects_placeholders() {
        let content = "---\ndependencies:\n  snippets:\n    - path: ../../snippets/{{ agpm.project.language }}.md\n---\nUse {{ framework }}.\n";
        let loaded = load_artifact(
            "claude-code/agents/a.md".to_string(),
            content,
            &FrontmatterExtractor::default(),
            "snippets",
        )
        .unwrap();

        assert!(!loaded.missing_metadata);
        assert!(loaded.diagnostics.is_empty());
        assert_eq!(loaded.artifact.dependencies.len(), 1);
        assert!(loaded.artifact.dependencies[0].is_unresolvable());
        let names: Vec<_> = loaded.artifact.placeholders.iter().map(String::as_str).collect();
        assert_eq!(names, vec!["framework", "language"]);
    }

    #[test]
    fn test_load_artifact_reports_malformed_and_bad_version() {
        let extractor = FrontmatterExtractor::default();
        let malformed = load_artifact("claude-code/agents/a.md".to_string(), "---\nx: [\n---\n", &extractor, "snippets")
            .unwrap();
        assert!(matches!(
            malformed.diagnostics.iter().next(),
            Some(Diagnostic::MalformedMetadata { .. })
        ));
        assert!(malformed.artifact.dependencies.is_empty());

        let versioned = load_artifact(
            "claude-code/agents/b.md".to_string(),
            "---\nagpm:\n  version: banana\n---\n",
            &extractor,
            "snippets",
        )
        .unwrap();
        assert!(matches!(versioned.diagnostics.iter().next(), Some(Diagnostic::InvalidVersion { .. })));
    }

    #[test]
    fn test_load_artifact_outside_tool_directories() {
        assert!(load_artifact("docs/a.md".to_string(), "", &FrontmatterExtractor::default(), "snippets").is_none());
    }

    #[tokio::test]
    async fn test_scan_counts_missing_metadata() {
        let fixture = RepoFixture::new().unwrap();
        fixture.add_file("claude-code/agents/x.md", "# X\n").unwrap();
        fixture
            .add_artifact("claude-code/commands/y.md", &[("snippets", "../../snippets/z.md")], "# Y\n")
            .unwrap();
        fixture.add_file("snippets/z.md", "# Z\n").unwrap();

        let outcome = SyncPipeline::new(fixture.path(), SyncConfig::default()).scan().await.unwrap();
        assert_eq!(outcome.graph.artifact_count(), 3);
        assert_eq!(outcome.missing_metadata, 2);
        assert!(outcome.diagnostics.is_empty());
    }
}
