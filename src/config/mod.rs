//! Configuration for a sync run.
//!
//! Every convention the pipeline relies on (which globs are scanned, where
//! axis values come from, how roles expand, which manifest sections are
//! regenerated) is a field of [`SyncConfig`] with a default matching the
//! standard agpm resource repository layout. A repository can override any
//! of them in `agpm-sync.toml` at its root:
//!
//! ```toml
//! primary_axis = "language"
//!
//! [[axes]]
//! name = "language"
//! directory = "snippets/best-practices"
//! file_pattern = "{value}-best-practices.md"
//!
//! [roles]
//! backend = "paired"
//! linting = "primary-only"
//!
//! [compatibility]
//! python = ["django", "fastapi"]
//! bash = []
//!
//! [manifest]
//! path = "examples/deps/agpm.toml"
//! source = "community"
//! ```
//!
//! Unknown keys are rejected so typos fail loudly.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::constants::{
    AXIS_VALUE_TOKEN, CONFIG_FILE_NAME, DEFAULT_EXCLUDED_FILES, DEFAULT_FRONTMATTER_MAX_LINES,
    DEFAULT_LIBRARY_PREFIX, DEFAULT_MANIFEST_PATH, DEFAULT_PATTERNS, DEFAULT_PRIMARY_AXIS,
    DEFAULT_SECONDARY_PREFIX, DEFAULT_TEMPLATE_NAMESPACE,
};
use crate::core::{ArtifactKind, SyncError, ToolCategory};
use crate::variants::{ExpansionStrategy, Role};

/// Full configuration of a sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Root-relative glob patterns of artifact files.
    pub patterns: Vec<String>,

    /// File names that are never artifacts.
    pub exclude_files: Vec<String>,

    /// First path segment of the shared library tree.
    pub library_prefix: String,

    /// Line limit for locating the closing frontmatter marker.
    pub frontmatter_max_lines: usize,

    /// Template axes and where their values are discovered.
    pub axes: Vec<AxisConfig>,

    /// Axis that role-restricted strategies key on.
    pub primary_axis: String,

    /// Namespace of axis values inside `template_vars`.
    pub template_namespace: String,

    /// Per-role strategy overrides.
    pub roles: BTreeMap<Role, ExpansionStrategy>,

    /// Allowed secondary values per primary value.
    pub compatibility: BTreeMap<String, Vec<String>>,

    /// Manifest location and layout.
    pub manifest: ManifestConfig,

    /// Number of concurrent file reads. Defaults to a multiple of the core count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallelism: Option<usize>,
}

/// One template axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxisConfig {
    /// Placeholder name, e.g. `language` for `{{ agpm.project.language }}`.
    pub name: String,
    /// Root-relative directory whose file names yield the values.
    pub directory: String,
    /// File name pattern with one `{value}` token.
    pub file_pattern: String,
}

impl AxisConfig {
    /// Create an axis definition.
    pub fn new(
        name: impl Into<String>,
        directory: impl Into<String>,
        file_pattern: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            directory: directory.into(),
            file_pattern: file_pattern.into(),
        }
    }

    /// Value encoded in `file_name`, if it matches the pattern.
    pub fn value_of<'a>(&self, file_name: &'a str) -> Option<&'a str> {
        let (prefix, suffix) = self.file_pattern.split_once(AXIS_VALUE_TOKEN)?;
        let value = file_name.strip_prefix(prefix)?.strip_suffix(suffix)?;
        (!value.is_empty()).then_some(value)
    }
}

/// Manifest location and the sections regenerated in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManifestConfig {
    /// Manifest path relative to the repository root.
    pub path: PathBuf,

    /// Regenerated sections, in the order they are appended when missing.
    pub sections: Vec<SectionConfig>,

    /// Source name written into every entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Prefix of secondary-tool entry names.
    pub secondary_prefix: String,

    /// Write entry paths relative to the manifest's directory instead of the
    /// repository root. Use this when the manifest refers to artifacts as
    /// local files rather than through a `source`.
    pub relative_to_manifest: bool,
}

/// A regenerated manifest section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionConfig {
    /// Table name, e.g. `agents`.
    pub name: String,
    /// Artifact kinds listed in the section.
    pub kinds: Vec<ArtifactKind>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_PATTERNS.iter().map(ToString::to_string).collect(),
            exclude_files: DEFAULT_EXCLUDED_FILES.iter().map(ToString::to_string).collect(),
            library_prefix: DEFAULT_LIBRARY_PREFIX.to_string(),
            frontmatter_max_lines: DEFAULT_FRONTMATTER_MAX_LINES,
            axes: vec![
                AxisConfig::new("language", "snippets/best-practices", "{value}-best-practices.md"),
                AxisConfig::new("framework", "snippets/frameworks", "{value}.md"),
            ],
            primary_axis: DEFAULT_PRIMARY_AXIS.to_string(),
            template_namespace: DEFAULT_TEMPLATE_NAMESPACE.to_string(),
            roles: BTreeMap::new(),
            compatibility: default_compatibility(),
            manifest: ManifestConfig::default(),
            parallelism: None,
        }
    }
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_MANIFEST_PATH),
            sections: vec![
                SectionConfig {
                    name: "agents".to_string(),
                    kinds: vec![ArtifactKind::Agent],
                },
                SectionConfig {
                    name: "commands".to_string(),
                    kinds: vec![ArtifactKind::Command],
                },
            ],
            source: None,
            secondary_prefix: DEFAULT_SECONDARY_PREFIX.to_string(),
            relative_to_manifest: false,
        }
    }
}

/// Language/framework pairings used when the configuration gives none.
///
/// Languages missing from the map pair with every framework; an empty list
/// means the language is never paired.
fn default_compatibility() -> BTreeMap<String, Vec<String>> {
    let table: &[(&str, &[&str])] = &[
        ("bash", &[]),
        ("golang", &["echo", "gin"]),
        ("java", &["spring"]),
        ("javascript", &["express", "react", "vue"]),
        ("python", &["django", "fastapi", "flask"]),
        ("rust", &["actix", "axum"]),
        ("typescript", &["angular", "express", "nestjs", "nextjs", "react", "vue"]),
    ];

    table
        .iter()
        .map(|(language, frameworks)| {
            (language.to_string(), frameworks.iter().map(ToString::to_string).collect())
        })
        .collect()
}

impl SyncConfig {
    /// Load the configuration for the repository at `root`.
    ///
    /// An explicit path must exist. Without one, `agpm-sync.toml` in `root`
    /// is used when present and the defaults otherwise.
    pub async fn load(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::load_from(path).await?,
            None => {
                let path = root.join(CONFIG_FILE_NAME);
                if path.exists() {
                    Self::load_from(&path).await?
                } else {
                    tracing::debug!("No {CONFIG_FILE_NAME} in {}, using defaults", root.display());
                    Self::default()
                }
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content).map_err(|e| {
            anyhow::Error::from(SyncError::ConfigError {
                message: format!("{}: {e}", path.display()),
            })
        })
    }

    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), SyncError> {
        let config_error = |message: String| SyncError::ConfigError {
            message,
        };

        for pattern in &self.patterns {
            glob::Pattern::new(pattern).map_err(|e| SyncError::InvalidGlobPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
            if ToolCategory::from_path(pattern, &self.library_prefix).is_none() {
                return Err(config_error(format!(
                    "pattern '{pattern}' must start with 'claude-code/', 'opencode/' or '{}/'",
                    self.library_prefix
                )));
            }
        }

        if self.frontmatter_max_lines < 2 {
            return Err(config_error("frontmatter_max_lines must be at least 2".to_string()));
        }

        let mut axis_names = BTreeSet::new();
        for axis in &self.axes {
            if !axis_names.insert(axis.name.as_str()) {
                return Err(config_error(format!("axis '{}' is defined twice", axis.name)));
            }
            if axis.file_pattern.matches(AXIS_VALUE_TOKEN).count() != 1 {
                return Err(config_error(format!(
                    "file_pattern of axis '{}' must contain exactly one {AXIS_VALUE_TOKEN}",
                    axis.name
                )));
            }
        }

        if !axis_names.contains(self.primary_axis.as_str()) {
            return Err(config_error(format!(
                "primary_axis '{}' is not one of the configured axes",
                self.primary_axis
            )));
        }

        let mut section_names = BTreeSet::new();
        for section in &self.manifest.sections {
            if section.name.trim().is_empty() {
                return Err(config_error("manifest section names cannot be empty".to_string()));
            }
            if !section_names.insert(section.name.as_str()) {
                return Err(config_error(format!(
                    "manifest section '{}' is configured twice",
                    section.name
                )));
            }
        }

        if self.parallelism == Some(0) {
            return Err(config_error("parallelism must be greater than zero".to_string()));
        }

        Ok(())
    }

    /// Effective number of concurrent reads.
    pub fn effective_parallelism(&self) -> usize {
        self.parallelism.unwrap_or_else(crate::constants::default_parallelism)
    }
}
