//! Expansion of top-level artifacts into manifest entries.
//!
//! An artifact that mentions no usable template axis becomes one base entry.
//! An artifact that does becomes one entry per allowed combination of axis
//! values, and never a base entry as well. When the policy allows no
//! combination at all, the artifact falls back to its base entry so every
//! top-level artifact appears at least once.
//!
//! Entry names are the base name followed by the selected values, primary
//! axis first and the remaining axes in alphabetical order:
//!
//! ```text
//! claude-code/agents/backend-engineer.md  ->  backend-engineer-python-django
//! opencode/agents/backend-engineer.md     ->  opencode-backend-engineer-python-django
//! ```

pub mod policy;

pub use policy::{Combination, CompatibilityPolicy, ExpansionStrategy, Role};

use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::SyncConfig;
use crate::constants::VARIANT_SEPARATOR;
use crate::core::{Artifact, Bucket, ToolCategory};
use crate::templating::DiscoveredAxes;

/// One generated manifest row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantEntry {
    /// Path of the un-varied artifact the entry installs.
    pub artifact_path: String,
    /// Bucket of the artifact.
    pub bucket: Bucket,
    /// Name of the un-varied entry.
    pub base_name: String,
    /// Derived entry name.
    pub name: String,
    /// File-system-safe form of `name`.
    pub identifier: String,
    /// Selected `(axis, value)` pairs in name order. Empty for a base entry.
    pub axis_values: Vec<(String, String)>,
    /// True when the entry stands in for the base entry.
    pub replaces_base: bool,
}

impl VariantEntry {
    fn base(artifact: &Artifact, base_name: String) -> Self {
        Self {
            artifact_path: artifact.path.clone(),
            bucket: artifact.bucket(),
            identifier: identifier_for(&base_name),
            name: base_name.clone(),
            base_name,
            axis_values: Vec::new(),
            replaces_base: false,
        }
    }

    /// Whether the entry is bound to axis values.
    pub fn is_variant(&self) -> bool {
        !self.axis_values.is_empty()
    }

    /// Installed file name override. Variants of one artifact would
    /// otherwise all install to the same file.
    pub fn filename(&self) -> Option<String> {
        if !self.is_variant() {
            return None;
        }
        let extension = self.artifact_path.rsplit_once('.').map(|(_, ext)| ext);
        Some(match extension {
            Some(ext) if !ext.contains('/') => format!("{}.{ext}", self.identifier),
            _ => self.identifier.clone(),
        })
    }

    /// Axis values as a map, for the entry's `template_vars`.
    pub fn template_vars(&self) -> BTreeMap<&str, &str> {
        self.axis_values.iter().map(|(axis, value)| (axis.as_str(), value.as_str())).collect()
    }
}

/// Lowercase `name` and replace everything outside `[a-z0-9-]` with `-`.
pub fn identifier_for(name: &str) -> String {
    name.chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Expands top-level artifacts into [`VariantEntry`] lists.
#[derive(Debug, Clone)]
pub struct VariantExpander {
    policy: CompatibilityPolicy,
    secondary_prefix: String,
}

impl VariantExpander {
    /// Create an expander.
    pub fn new(policy: CompatibilityPolicy, secondary_prefix: impl Into<String>) -> Self {
        Self {
            policy,
            secondary_prefix: secondary_prefix.into(),
        }
    }

    /// Create the expander a configuration describes.
    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(CompatibilityPolicy::from_config(config), config.manifest.secondary_prefix.clone())
    }

    /// Name of the un-varied entry for `artifact`.
    pub fn base_name(&self, artifact: &Artifact) -> String {
        match artifact.tool {
            ToolCategory::OpenCode => format!("{}{}", self.secondary_prefix, artifact.stem()),
            ToolCategory::ClaudeCode | ToolCategory::Library => artifact.stem().to_string(),
        }
    }

    /// Entries for one artifact, sorted by name.
    pub fn expand(&self, artifact: &Artifact, axes: &DiscoveredAxes) -> Vec<VariantEntry> {
        let base_name = self.base_name(artifact);
        let usable = axes.usable_values(&artifact.placeholders);
        if usable.is_empty() {
            return vec![VariantEntry::base(artifact, base_name)];
        }

        let role = Role::classify(artifact.stem());
        let combinations = self.policy.combinations(role, &usable);
        if combinations.is_empty() {
            tracing::debug!(
                "{} ({role}) allows no combination of {:?}, keeping base entry",
                artifact.path,
                usable.keys().collect::<Vec<_>>()
            );
            return vec![VariantEntry::base(artifact, base_name)];
        }

        let mut entries: Vec<VariantEntry> = combinations
            .into_iter()
            .map(|combination| self.variant(artifact, &base_name, combination))
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries.dedup_by(|a, b| a.name == b.name);

        tracing::trace!("{} expands to {} variants", artifact.path, entries.len());
        entries
    }

    fn variant(&self, artifact: &Artifact, base_name: &str, mut combination: Combination) -> VariantEntry {
        let mut axis_values = Vec::with_capacity(combination.len());
        if let Some(primary) = combination.remove(self.policy.primary_axis()) {
            axis_values.push((self.policy.primary_axis().to_string(), primary));
        }
        axis_values.extend(combination);

        let mut name = base_name.to_string();
        for (_, value) in &axis_values {
            name.push_str(VARIANT_SEPARATOR);
            name.push_str(value);
        }

        VariantEntry {
            artifact_path: artifact.path.clone(),
            bucket: artifact.bucket(),
            base_name: base_name.to_string(),
            identifier: identifier_for(&name),
            name,
            axis_values,
            replaces_base: true,
        }
    }

    /// Expand every bucket. Entries within a bucket are sorted by name.
    pub fn expand_all(
        &self,
        buckets: &BTreeMap<Bucket, Vec<&Artifact>>,
        axes: &DiscoveredAxes,
    ) -> BTreeMap<Bucket, Vec<VariantEntry>> {
        buckets
            .iter()
            .map(|(bucket, artifacts)| {
                let mut entries: Vec<VariantEntry> =
                    artifacts.iter().flat_map(|artifact| self.expand(artifact, axes)).collect();
                entries.sort_by(|a, b| {
                    a.name.cmp(&b.name).then_with(|| a.artifact_path.cmp(&b.artifact_path))
                });
                (*bucket, entries)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ArtifactKind;
    use crate::templating::TemplateAxis;
    use std::collections::BTreeSet;

    fn artifact(path: &str, placeholders: &[&str]) -> Artifact {
        Artifact {
            path: path.to_string(),
            tool: ToolCategory::from_path(path, "snippets").unwrap(),
            kind: ArtifactKind::from_path(path),
            metadata: None,
            dependencies: Vec::new(),
            placeholders: placeholders.iter().map(ToString::to_string).collect(),
        }
    }

    fn axes(entries: &[(&str, &[&str])]) -> DiscoveredAxes {
        entries
            .iter()
            .map(|(name, values)| TemplateAxis {
                name: name.to_string(),
                values: values.iter().map(ToString::to_string).collect::<BTreeSet<_>>(),
            })
            .collect()
    }

    fn expander() -> VariantExpander {
        VariantExpander::from_config(&SyncConfig::default())
    }

    fn names(entries: &[VariantEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_no_placeholders_emits_base() {
        let a = artifact("claude-code/agents/reviewer.md", &[]);
        let entries = expander().expand(&a, &axes(&[("language", &["go"])]));
        assert_eq!(names(&entries), vec!["reviewer"]);
        assert!(!entries[0].is_variant());
        assert!(!entries[0].replaces_base);
        assert_eq!(entries[0].filename(), None);
    }

    #[test]
    fn test_scenario_b() {
        let a = artifact("claude-code/agents/helper.md", &["language"]);
        let entries = expander().expand(&a, &axes(&[("language", &["go", "python"])]));
        assert_eq!(names(&entries), vec!["helper-go", "helper-python"]);
        assert!(entries.iter().all(|e| e.replaces_base && e.name != "helper"));
        assert_eq!(entries[0].artifact_path, "claude-code/agents/helper.md");
        assert_eq!(entries[1].filename().as_deref(), Some("helper-python.md"));
        assert_eq!(entries[1].template_vars(), BTreeMap::from([("language", "python")]));
    }

    #[test]
    fn test_unusable_axes_fall_back_to_base() {
        let a = artifact("claude-code/agents/helper.md", &["framework", "name"]);
        let entries = expander().expand(&a, &axes(&[("framework", &[]), ("language", &["go"])]));
        assert_eq!(names(&entries), vec!["helper"]);
    }

    #[test]
    fn test_zero_combinations_fall_back_to_base() {
        // A linter varies on the primary axis only, which it does not use.
        let a = artifact("claude-code/agents/style-linter.md", &["framework"]);
        let entries = expander().expand(&a, &axes(&[("framework", &["django"]), ("language", &["go"])]));
        assert_eq!(names(&entries), vec!["style-linter"]);
    }

    #[test]
    fn test_primary_axis_comes_first_in_names() {
        let a = artifact("opencode/agents/full-stack.md", &["framework", "language"]);
        let entries = expander().expand(
            &a,
            &axes(&[("framework", &["django", "gin"]), ("language", &["golang", "python"])]),
        );
        assert_eq!(
            names(&entries),
            vec![
                "opencode-full-stack-golang-django",
                "opencode-full-stack-golang-gin",
                "opencode-full-stack-python-django",
                "opencode-full-stack-python-gin",
            ]
        );
        assert_eq!(
            entries[0].axis_values,
            vec![
                ("language".to_string(), "golang".to_string()),
                ("framework".to_string(), "django".to_string())
            ]
        );
    }

    #[test]
    fn test_backend_pairs_by_compatibility() {
        let a = artifact("claude-code/agents/backend-engineer.md", &["framework", "language"]);
        let entries = expander().expand(
            &a,
            &axes(&[("framework", &["django", "gin"]), ("language", &["bash", "golang", "python"])]),
        );
        assert_eq!(
            names(&entries),
            vec!["backend-engineer-bash", "backend-engineer-golang-gin", "backend-engineer-python-django"]
        );
    }

    #[test]
    fn test_identifier_for() {
        assert_eq!(identifier_for("Helper-C++"), "helper-c--");
        assert_eq!(identifier_for("opencode-a_b.c"), "opencode-a-b-c");
    }

    #[test]
    fn test_expand_all_sorts_within_bucket() {
        let zeta = artifact("claude-code/agents/zeta.md", &[]);
        let alpha = artifact("claude-code/agents/alpha.md", &["language"]);
        let cmd = artifact("claude-code/commands/build.md", &[]);
        let mut buckets = BTreeMap::new();
        buckets.insert(zeta.bucket(), vec![&zeta, &alpha]);
        buckets.insert(cmd.bucket(), vec![&cmd]);

        let expanded = expander().expand_all(&buckets, &axes(&[("language", &["rust", "go"])]));
        assert_eq!(names(&expanded[&zeta.bucket()]), vec!["alpha-go", "alpha-rust", "zeta"]);
        for entries in expanded.values() {
            assert!(entries.windows(2).all(|w| w[0].name <= w[1].name));
        }
    }
}
