//! Artifact model for the scanned resource repository.
//!
//! An [`Artifact`] is one prompt/instruction file found by the scanner. Its
//! identity is the canonical repository-relative path (forward slashes, no
//! `.`/`..` segments). Everything else is derived from that path and the
//! file's frontmatter, once, when the artifact is loaded; artifacts are never
//! mutated afterwards and never persisted between runs.
//!
//! Path layout conventions:
//!
//! ```text
//! claude-code/agents/backend-engineer.md     -> (ClaudeCode, Agent)
//! opencode/commands/commit.md                -> (OpenCode, Command)
//! claude-code/hooks/pre-commit.json          -> (ClaudeCode, Other)
//! snippets/best-practices/rust-best-practices.md -> (Library, Other)
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::metadata::{ArtifactMetadata, DependencyCategory};

/// Tool an artifact belongs to, taken from the first path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolCategory {
    /// The primary tool, under `claude-code/`.
    ClaudeCode,
    /// The secondary tool, under `opencode/`.
    OpenCode,
    /// The shared library tree (`snippets/...` by default). Never emitted as
    /// a top-level manifest entry.
    Library,
}

impl ToolCategory {
    /// Classify a canonical path by its first segment.
    ///
    /// Returns `None` when the first segment is not a known tool directory.
    pub fn from_path(path: &str, library_prefix: &str) -> Option<Self> {
        let first = path.split('/').next()?;
        match first {
            "claude-code" => Some(Self::ClaudeCode),
            "opencode" => Some(Self::OpenCode),
            prefix if prefix == library_prefix => Some(Self::Library),
            _ => None,
        }
    }

    /// Value written to the `tool` field of manifest entries.
    ///
    /// The primary tool is the manifest default and gets no tag.
    pub fn manifest_tag(&self) -> Option<&'static str> {
        match self {
            Self::ClaudeCode | Self::Library => None,
            Self::OpenCode => Some("opencode"),
        }
    }

    /// Human-readable name used in generated comments and the summary.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ClaudeCode => "Claude Code",
            Self::OpenCode => "OpenCode",
            Self::Library => "Library",
        }
    }

    /// Tool component of a release tag (`{tool}-{category}-{name}-v{version}`).
    pub fn tag_component(&self) -> &'static str {
        match self {
            Self::ClaudeCode => "claude-code",
            Self::OpenCode => "opencode",
            Self::Library => "snippet",
        }
    }
}

impl fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Artifact type, decided by an `agents` or `commands` directory segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Lives under an `agents/` directory.
    Agent,
    /// Lives under a `commands/` directory.
    Command,
    /// Anything else (hooks, MCP servers, snippets, ...).
    Other,
}

impl ArtifactKind {
    /// Classify a canonical path by its directory segments.
    ///
    /// The file name itself is never considered, so `agents.md` at the root
    /// of a tool directory is still [`ArtifactKind::Other`].
    pub fn from_path(path: &str) -> Self {
        let mut segments: Vec<&str> = path.split('/').collect();
        segments.pop();
        if segments.contains(&"agents") {
            Self::Agent
        } else if segments.contains(&"commands") {
            Self::Command
        } else {
            Self::Other
        }
    }

    /// Plural label used in comments (`agents`, `commands`, `other`).
    pub fn plural(&self) -> &'static str {
        match self {
            Self::Agent => "agents",
            Self::Command => "commands",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Agent => f.write_str("agent"),
            Self::Command => f.write_str("command"),
            Self::Other => f.write_str("other"),
        }
    }
}

/// The `(tool, type)` bucket a top-level artifact is reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Bucket {
    /// Tool category.
    pub tool: ToolCategory,
    /// Artifact type.
    pub kind: ArtifactKind,
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tool, self.kind.plural())
    }
}

/// A dependency edge declared in an artifact's metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    /// Canonical path of the declaring artifact.
    pub declared_by: String,
    /// The path exactly as written in the frontmatter.
    pub raw_path: String,
    /// Canonical target path. `None` when the raw path contains a placeholder.
    pub target: Option<String>,
    /// Category key the dependency was declared under.
    pub category: DependencyCategory,
    /// Optional display name from the frontmatter.
    pub name: Option<String>,
    /// Optional tool tag.
    pub tool: Option<String>,
    /// Informational install flag; has no effect on the graph.
    pub install: Option<bool>,
}

impl Dependency {
    /// True when the target could not be determined statically.
    pub fn is_unresolvable(&self) -> bool {
        self.target.is_none()
    }
}

/// One scanned artifact file.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Canonical repository-relative path.
    pub path: String,
    /// Tool category from the first path segment.
    pub tool: ToolCategory,
    /// Artifact type from the directory segments.
    pub kind: ArtifactKind,
    /// Parsed frontmatter, absent when the file has none or it was malformed.
    pub metadata: Option<ArtifactMetadata>,
    /// Declared dependencies, resolved or not.
    pub dependencies: Vec<Dependency>,
    /// Template axis names used in the body or in dependency paths.
    pub placeholders: BTreeSet<String>,
}

impl Artifact {
    /// File name without extension.
    pub fn stem(&self) -> &str {
        let file_name = self.path.rsplit('/').next().unwrap_or(&self.path);
        file_name.rsplit_once('.').map_or(file_name, |(stem, _)| stem)
    }

    /// Bucket this artifact is reported in.
    pub fn bucket(&self) -> Bucket {
        Bucket {
            tool: self.tool,
            kind: self.kind,
        }
    }

    /// Declared `agpm.version`, if any.
    pub fn version(&self) -> Option<&str> {
        self.metadata.as_ref()?.agpm.as_ref()?.version.as_deref()
    }

    /// Release tag in the `{tool}-{category}-{name}-v{version}` convention.
    ///
    /// `None` when the artifact does not declare a version.
    pub fn release_tag(&self) -> Option<String> {
        let version = self.version()?;
        let (category, name) = tag_category_and_name(&self.path, self.stem());
        Some(format!("{}-{category}-{name}-v{version}", self.tool.tag_component()))
    }
}

/// Category and name components of a release tag.
///
/// The category is the second path segment singularised for the well-known
/// directories. Best-practice and styleguide snippets drop their redundant
/// suffix so `rust-best-practices.md` is tagged as `rust`.
fn tag_category_and_name(path: &str, stem: &str) -> (String, String) {
    let category = match path.split('/').nth(1) {
        Some("agents") => "agent",
        Some("commands") => "command",
        Some("hooks") => "hook",
        Some("mcp-servers") => "mcp-server",
        Some(other) if path.matches('/').count() > 1 => other,
        _ => "resource",
    };

    let name = match category {
        "best-practices" => stem.strip_suffix("-best-practices").unwrap_or(stem),
        "styleguides" => stem.strip_suffix("-styleguide").unwrap_or(stem),
        _ => stem,
    };

    (category.to_string(), name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::AgpmSection;

    fn artifact(path: &str) -> Artifact {
        Artifact {
            path: path.to_string(),
            tool: ToolCategory::from_path(path, "snippets").unwrap(),
            kind: ArtifactKind::from_path(path),
            metadata: None,
            dependencies: Vec::new(),
            placeholders: BTreeSet::new(),
        }
    }

    #[test]
    fn test_tool_category_from_path() {
        assert_eq!(
            ToolCategory::from_path("claude-code/agents/x.md", "snippets"),
            Some(ToolCategory::ClaudeCode)
        );
        assert_eq!(
            ToolCategory::from_path("opencode/commands/y.md", "snippets"),
            Some(ToolCategory::OpenCode)
        );
        assert_eq!(
            ToolCategory::from_path("snippets/agents/z.md", "snippets"),
            Some(ToolCategory::Library)
        );
        assert_eq!(ToolCategory::from_path("docs/z.md", "snippets"), None);
        assert_eq!(ToolCategory::from_path("lib/z.md", "lib"), Some(ToolCategory::Library));
    }

    #[test]
    fn test_kind_ignores_file_name() {
        assert_eq!(ArtifactKind::from_path("claude-code/agents/x.md"), ArtifactKind::Agent);
        assert_eq!(
            ArtifactKind::from_path("opencode/commands/nested/y.md"),
            ArtifactKind::Command
        );
        assert_eq!(ArtifactKind::from_path("claude-code/hooks/h.json"), ArtifactKind::Other);
        assert_eq!(ArtifactKind::from_path("claude-code/agents.md"), ArtifactKind::Other);
    }

    #[test]
    fn test_stem() {
        assert_eq!(artifact("claude-code/agents/backend-engineer.md").stem(), "backend-engineer");
        assert_eq!(artifact("claude-code/hooks/pre.commit.json").stem(), "pre.commit");
    }

    #[test]
    fn test_release_tag_requires_version() {
        let mut a = artifact("snippets/best-practices/rust-best-practices.md");
        assert_eq!(a.release_tag(), None);

        a.metadata = Some(ArtifactMetadata {
            dependencies: None,
            agpm: Some(AgpmSection {
                version: Some("1.2.0".to_string()),
                templating: None,
            }),
        });
        assert_eq!(a.release_tag().as_deref(), Some("snippet-best-practices-rust-v1.2.0"));
    }

    #[test]
    fn test_release_tag_categories() {
        let versioned = |path: &str| {
            let mut a = artifact(path);
            a.metadata = Some(ArtifactMetadata {
                dependencies: None,
                agpm: Some(AgpmSection {
                    version: Some("1.0.0".to_string()),
                    templating: None,
                }),
            });
            a.release_tag().unwrap()
        };

        assert_eq!(versioned("claude-code/agents/helper.md"), "claude-code-agent-helper-v1.0.0");
        assert_eq!(versioned("opencode/mcp-servers/fs.json"), "opencode-mcp-server-fs-v1.0.0");
        assert_eq!(
            versioned("snippets/styleguides/golang-styleguide.md"),
            "snippet-styleguides-golang-v1.0.0"
        );
    }
}
