//! Manifest section synchronization.
//!
//! The synchronizer owns a fixed, configured subset of the manifest's
//! sections (by default `[agents]` and `[commands]`). Their bodies are
//! discarded and regenerated from the expanded top-level entries; every other
//! byte of the file, the preamble and every other section with its comments,
//! is copied through unchanged.
//!
//! ```toml
//! [sources]
//! community = "https://github.com/example/agpm-community.git"
//!
//! [agents]
//! # Generated by agpm-sync from top-level artifacts. Do not edit by hand.
//! # Claude Code agents
//! reviewer = { path = "claude-code/agents/reviewer.md" }
//!
//! # OpenCode resources
//! # OpenCode agents
//! opencode-reviewer = { path = "opencode/agents/reviewer.md", tool = "opencode" }
//!
//! [hooks]
//! # Hand-maintained, never touched.
//! pre-commit = { path = "claude-code/hooks/pre-commit.json" }
//! ```
//!
//! Output is validated by re-parsing it before anything is written, and a
//! run on unchanged inputs reproduces the file byte for byte.

pub mod document;
pub mod render;

pub use document::{LineEnding, ManifestDocument, Section};
pub use render::EntryRenderer;

use anyhow::Result;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::config::{ManifestConfig, SectionConfig, SyncConfig};
use crate::core::{Bucket, SyncError};
use crate::utils::fs::{safe_write, to_forward_slash};
use crate::variants::VariantEntry;

/// Computed manifest content next to what is on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestUpdate {
    /// Absolute manifest path.
    pub path: PathBuf,
    /// Current content; `None` when the file does not exist yet.
    pub original: Option<String>,
    /// Synchronized content.
    pub updated: String,
}

impl ManifestUpdate {
    /// Whether writing would change the file.
    pub fn changed(&self) -> bool {
        self.original.as_deref() != Some(self.updated.as_str())
    }

    /// Write the synchronized content when it differs from the file.
    ///
    /// Returns whether anything was written.
    pub fn write(&self) -> Result<bool> {
        if !self.changed() {
            tracing::debug!("{} is up to date", self.path.display());
            return Ok(false);
        }
        safe_write(&self.path, &self.updated)?;
        tracing::info!("Updated {}", self.path.display());
        Ok(true)
    }
}

/// Entry keys added to or removed from the regenerated sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntryChanges {
    /// `section.name` keys present only in the synchronized content.
    pub added: Vec<String>,
    /// `section.name` keys present only in the current file.
    pub removed: Vec<String>,
}

impl EntryChanges {
    /// Whether no entry was added or removed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

fn section_keys(text: &str, sections: &[SectionConfig]) -> BTreeSet<String> {
    let Ok(document) = text.parse::<toml_edit::DocumentMut>() else {
        return BTreeSet::new();
    };
    sections
        .iter()
        .filter_map(|section| {
            let table = document.get(&section.name)?.as_table_like()?;
            Some(table.iter().map(|(key, _)| format!("{}.{key}", section.name)).collect::<Vec<_>>())
        })
        .flatten()
        .collect()
}

impl ManifestUpdate {
    /// Compare the entries of `sections` before and after synchronization.
    pub fn entry_changes(&self, sections: &[SectionConfig]) -> EntryChanges {
        let before = section_keys(self.original.as_deref().unwrap_or_default(), sections);
        let after = section_keys(&self.updated, sections);
        EntryChanges {
            added: after.difference(&before).cloned().collect(),
            removed: before.difference(&after).cloned().collect(),
        }
    }
}

/// Regenerates the configured manifest sections.
#[derive(Debug, Clone)]
pub struct ManifestSynchronizer {
    path: PathBuf,
    sections: Vec<SectionConfig>,
    renderer: EntryRenderer,
}

impl ManifestSynchronizer {
    /// Synchronizer for a manifest configuration.
    pub fn new(config: &ManifestConfig, template_namespace: &str) -> Self {
        let manifest_dir = config.path.parent().map(to_forward_slash).unwrap_or_default();
        Self {
            path: config.path.clone(),
            sections: config.sections.clone(),
            renderer: EntryRenderer::new(config, template_namespace, &manifest_dir),
        }
    }

    /// Synchronizer described by a full configuration.
    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(&config.manifest, &config.template_namespace)
    }

    /// Manifest path relative to the repository root.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sections this synchronizer owns, in configuration order.
    pub fn sections(&self) -> &[SectionConfig] {
        &self.sections
    }

    /// Regenerate the configured sections of `existing`.
    ///
    /// Sections missing from `existing` are appended in configuration
    /// order. Pure: nothing is read or written.
    ///
    /// # Errors
    ///
    /// - [`SyncError::ManifestParseError`] if `existing` is not valid TOML
    /// - [`SyncError::GeneratedManifestInvalid`] if the result does not
    ///   re-parse, for example because two entries derive the same name
    pub fn synchronize(
        &self,
        existing: &str,
        entries: &BTreeMap<Bucket, Vec<VariantEntry>>,
    ) -> Result<String, SyncError> {
        existing.parse::<toml_edit::DocumentMut>().map_err(|e| SyncError::ManifestParseError {
            file: self.path.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut document = ManifestDocument::parse(existing);
        for section in &self.sections {
            if !document.contains(&section.name) {
                tracing::debug!("Appending missing section [{}]", section.name);
                document.append_section(&section.name);
            }
        }

        for section in &self.sections {
            let body = self.renderer.render_section_body(
                &section.kinds,
                entries,
                document.line_ending(),
                document.is_followed(&section.name),
            );
            document.replace_body(&section.name, &body);
        }

        let output = document.render();
        output.parse::<toml_edit::DocumentMut>().map_err(|e| SyncError::GeneratedManifestInvalid {
            reason: e.to_string(),
        })?;

        Ok(output)
    }

    /// Read the manifest under `root` and compute its synchronized content.
    pub async fn plan(
        &self,
        root: &Path,
        entries: &BTreeMap<Bucket, Vec<VariantEntry>>,
    ) -> Result<ManifestUpdate> {
        let path = root.join(&self.path);
        let original = read_manifest(&path).await?;
        let updated = self.synchronize(original.as_deref().unwrap_or_default(), entries)?;

        Ok(ManifestUpdate {
            path,
            original,
            updated,
        })
    }
}

/// Read a manifest, `None` when it does not exist.
pub async fn read_manifest(path: &Path) -> Result<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("Manifest {} does not exist yet", path.display());
            Ok(None)
        }
        Err(e) => Err(SyncError::ManifestReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::GENERATED_HEADER_COMMENT;
    use crate::core::{ArtifactKind, ToolCategory};
    use tempfile::TempDir;

    fn entry(path: &str, name: &str) -> VariantEntry {
        let tool = ToolCategory::from_path(path, "snippets").unwrap();
        VariantEntry {
            artifact_path: path.to_string(),
            bucket: Bucket {
                tool,
                kind: ArtifactKind::from_path(path),
            },
            base_name: name.to_string(),
            name: name.to_string(),
            identifier: name.to_string(),
            axis_values: Vec::new(),
            replaces_base: false,
        }
    }

    fn entries(list: Vec<VariantEntry>) -> BTreeMap<Bucket, Vec<VariantEntry>> {
        let mut map: BTreeMap<Bucket, Vec<VariantEntry>> = BTreeMap::new();
        for e in list {
            map.entry(e.bucket).or_default().push(e);
        }
        map
    }

    fn synchronizer() -> ManifestSynchronizer {
        ManifestSynchronizer::from_config(&SyncConfig::default())
    }

    const MANIFEST: &str = r#"# Example manifest
[sources]
community = "https://github.com/example/community.git"

[agents]
stale = { path = "claude-code/agents/stale.md" }

# Hooks are maintained by hand
[hooks]
pre-commit = { path = "claude-code/hooks/pre-commit.json" } # keep me

[commands]
old = { path = "claude-code/commands/old.md" }

[mcp-servers]
# filesystem server
fs = { path = "claude-code/mcp-servers/fs.json" }
"#;

    #[test]
    fn test_regenerates_only_owned_sections() {
        let list = entries(vec![
            entry("claude-code/agents/reviewer.md", "reviewer"),
            entry("claude-code/commands/build.md", "build"),
            entry("opencode/agents/reviewer.md", "opencode-reviewer"),
        ]);
        let output = synchronizer().synchronize(MANIFEST, &list).unwrap();

        assert!(!output.contains("stale"));
        assert!(!output.contains("old ="));
        assert!(output.contains("reviewer = { path = \"claude-code/agents/reviewer.md\" }"));
        assert!(output.contains("opencode-reviewer = { path = \"opencode/agents/reviewer.md\", tool = \"opencode\" }"));
        assert!(output.starts_with("# Example manifest\n[sources]\n"));
        assert!(output.contains(
            "# Hooks are maintained by hand\n[hooks]\npre-commit = { path = \"claude-code/hooks/pre-commit.json\" } # keep me\n\n[commands]\n"
        ));
        assert!(output.ends_with("[mcp-servers]\n# filesystem server\nfs = { path = \"claude-code/mcp-servers/fs.json\" }\n"));
    }

    #[test]
    fn test_synchronize_is_idempotent() {
        let list = entries(vec![
            entry("claude-code/agents/a.md", "a"),
            entry("opencode/commands/c.md", "opencode-c"),
        ]);
        let once = synchronizer().synchronize(MANIFEST, &list).unwrap();
        let twice = synchronizer().synchronize(&once, &list).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_unterminated_owned_header_is_idempotent() {
        let list = entries(vec![entry("claude-code/agents/a.md", "a")]);
        let once = synchronizer().synchronize("[commands]\n[agents]", &list).unwrap();
        let twice = synchronizer().synchronize(&once, &list).unwrap();

        assert!(once.contains(&format!("[agents]\n{GENERATED_HEADER_COMMENT}\n")));
        assert_eq!(once.matches(GENERATED_HEADER_COMMENT).count(), 2);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_generated_trailer_is_not_kept_above_new_section() {
        let list = entries(vec![entry("claude-code/agents/a.md", "a")]);
        let synced = synchronizer().synchronize("[commands]\n[agents]\n", &list).unwrap();
        let edited = format!("{synced}[hooks]\nx = 1\n");

        let once = synchronizer().synchronize(&edited, &list).unwrap();
        let agents = ManifestDocument::parse(&once).section("agents").unwrap().body.concat();
        assert_eq!(agents.matches("# OpenCode resources").count(), 1);
        assert_eq!(once.matches("# OpenCode resources").count(), 2);
        assert!(once.ends_with("# OpenCode resources\n\n[hooks]\nx = 1\n"));
        assert_eq!(synchronizer().synchronize(&once, &list).unwrap(), once);
    }

    #[test]
    fn test_multiline_array_in_owned_section_is_replaced() {
        let list = entries(vec![entry("claude-code/agents/a.md", "a")]);
        let input = "[agents]\nmatrix = [\n[1, 2],\n[3, 4]\n]\n\n[hooks]\nx = 1\n";
        let output = synchronizer().synchronize(input, &list).unwrap();

        assert!(!output.contains("matrix"));
        assert!(!output.contains("[3, 4]"));
        assert!(output.ends_with("\n[hooks]\nx = 1\n"));
    }

    #[test]
    fn test_missing_sections_are_appended() {
        let list = entries(vec![entry("claude-code/agents/a.md", "a")]);
        let output = synchronizer().synchronize("[sources]\nx = \"y\"\n", &list).unwrap();

        assert_eq!(
            output,
            format!(
                "[sources]\nx = \"y\"\n\n\
                 [agents]\n{GENERATED_HEADER_COMMENT}\n# Claude Code agents\na = {{ path = \"claude-code/agents/a.md\" }}\n\n# OpenCode resources\n\n\
                 [commands]\n{GENERATED_HEADER_COMMENT}\n\n# OpenCode resources\n"
            )
        );
        assert_eq!(synchronizer().synchronize(&output, &list).unwrap(), output);
    }

    #[test]
    fn test_crlf_is_preserved() {
        let input = MANIFEST.replace('\n', "\r\n");
        let list = entries(vec![entry("claude-code/agents/a.md", "a")]);
        let output = synchronizer().synchronize(&input, &list).unwrap();
        assert!(!output.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn test_invalid_input_manifest() {
        let err = synchronizer().synchronize("[agents\n", &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, SyncError::ManifestParseError { .. }));
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let list = entries(vec![
            entry("claude-code/agents/a.md", "a"),
            entry("claude-code/agents/nested/a.md", "a"),
        ]);
        let err = synchronizer().synchronize("", &list).unwrap_err();
        assert!(matches!(err, SyncError::GeneratedManifestInvalid { .. }));
    }

    #[tokio::test]
    async fn test_plan_and_write() {
        let temp = TempDir::new().unwrap();
        let list = entries(vec![entry("claude-code/agents/a.md", "a")]);
        let sync = synchronizer();

        let update = sync.plan(temp.path(), &list).await.unwrap();
        assert!(update.original.is_none());
        assert!(update.changed());
        assert!(update.write().unwrap());

        let again = sync.plan(temp.path(), &list).await.unwrap();
        assert!(!again.changed());
        assert!(!again.write().unwrap());
        assert!(temp.path().join("examples/deps/agpm.toml").exists());
    }

    #[test]
    fn test_entry_changes() {
        let list = entries(vec![
            entry("claude-code/agents/reviewer.md", "reviewer"),
            entry("claude-code/commands/old.md", "old"),
        ]);
        let sync = synchronizer();
        let update = ManifestUpdate {
            path: PathBuf::from("agpm.toml"),
            original: Some(MANIFEST.to_string()),
            updated: sync.synchronize(MANIFEST, &list).unwrap(),
        };

        let changes = update.entry_changes(sync.sections());
        assert_eq!(changes.added, vec!["agents.reviewer"]);
        assert_eq!(changes.removed, vec!["agents.stale"]);
        assert!(!changes.is_empty());

        let unchanged = ManifestUpdate {
            original: Some(update.updated.clone()),
            ..update
        };
        assert!(unchanged.entry_changes(sync.sections()).is_empty());
    }
}
