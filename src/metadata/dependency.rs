//! Typed frontmatter records.
//!
//! Dependency categories are a closed set: a frontmatter block that declares
//! an unknown category fails to parse and is reported as malformed instead
//! of being silently ignored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Category key of a `dependencies` map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyCategory {
    /// `agents:`
    Agents,
    /// `snippets:`
    Snippets,
    /// `commands:`
    Commands,
    /// `scripts:`
    Scripts,
    /// `hooks:`
    Hooks,
    /// `mcp-servers:`
    McpServers,
}

impl fmt::Display for DependencyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Agents => "agents",
            Self::Snippets => "snippets",
            Self::Commands => "commands",
            Self::Scripts => "scripts",
            Self::Hooks => "hooks",
            Self::McpServers => "mcp-servers",
        };
        f.write_str(name)
    }
}

/// One declared dependency.
///
/// ```yaml
/// dependencies:
///   snippets:
///     - name: rust-best-practices
///       path: ../../snippets/best-practices/rust-best-practices.md
///       tool: agpm
///       install: false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DependencySpec {
    /// Path relative to the declaring file. May contain placeholders.
    pub path: String,

    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Optional target tool (`claude-code`, `opencode`, `agpm`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,

    /// Whether the dependency is installed alongside its parent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install: Option<bool>,

    /// Optional version constraint. Recorded, never resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// The `agpm:` section of an artifact's metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgpmSection {
    /// Artifact version, expected to be semver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Whether the body is rendered as a template when installed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templating: Option<bool>,
}

/// Parsed metadata block of an artifact.
///
/// Keys other than `dependencies` and `agpm` (description, model, tools, ...)
/// are accepted and ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Declared dependencies by category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<BTreeMap<DependencyCategory, Vec<DependencySpec>>>,

    /// agpm-specific settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agpm: Option<AgpmSection>,
}

impl ArtifactMetadata {
    /// Check if this metadata contains any dependencies.
    pub fn has_dependencies(&self) -> bool {
        self.dependencies.as_ref().is_some_and(|deps| deps.values().any(|v| !v.is_empty()))
    }

    /// Get the total count of dependencies.
    pub fn dependency_count(&self) -> usize {
        self.dependencies.as_ref().map_or(0, |deps| deps.values().map(Vec::len).sum())
    }

    /// Iterate over `(category, spec)` pairs in category order.
    pub fn iter_dependencies(&self) -> impl Iterator<Item = (DependencyCategory, &DependencySpec)> {
        self.dependencies
            .iter()
            .flat_map(|deps| deps.iter())
            .flat_map(|(category, specs)| specs.iter().map(move |spec| (*category, spec)))
    }

    /// Declared version when it is not valid semver.
    pub fn invalid_version(&self) -> Option<&str> {
        let version = self.agpm.as_ref()?.version.as_deref()?;
        let bare = version.strip_prefix('v').unwrap_or(version);
        semver::Version::parse(bare).is_err().then_some(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(path: &str) -> DependencySpec {
        DependencySpec {
            path: path.to_string(),
            name: None,
            tool: None,
            install: None,
            version: None,
        }
    }

    #[test]
    fn test_dependency_counts() {
        let mut metadata = ArtifactMetadata::default();
        assert!(!metadata.has_dependencies());

        let mut deps = BTreeMap::new();
        deps.insert(DependencyCategory::Agents, vec![]);
        metadata.dependencies = Some(deps);
        assert!(!metadata.has_dependencies());

        let mut deps = BTreeMap::new();
        deps.insert(DependencyCategory::Snippets, vec![spec("a.md"), spec("b.md")]);
        deps.insert(DependencyCategory::Agents, vec![spec("c.md")]);
        metadata.dependencies = Some(deps);
        assert!(metadata.has_dependencies());
        assert_eq!(metadata.dependency_count(), 3);

        let categories: Vec<_> = metadata.iter_dependencies().map(|(c, s)| (c, s.path.as_str())).collect();
        assert_eq!(
            categories,
            vec![
                (DependencyCategory::Agents, "c.md"),
                (DependencyCategory::Snippets, "a.md"),
                (DependencyCategory::Snippets, "b.md"),
            ]
        );
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let yaml = "dependencies:\n  widgets:\n    - path: a.md\n";
        assert!(serde_yaml::from_str::<ArtifactMetadata>(yaml).is_err());
    }

    #[test]
    fn test_unrelated_keys_are_ignored() {
        let yaml = "name: helper\ndescription: Helps\nmodel: sonnet\n";
        let metadata: ArtifactMetadata = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(metadata, ArtifactMetadata::default());
    }

    #[test]
    fn test_invalid_version() {
        let with_version = |v: &str| ArtifactMetadata {
            dependencies: None,
            agpm: Some(AgpmSection {
                version: Some(v.to_string()),
                templating: None,
            }),
        };

        assert_eq!(with_version("1.0.0").invalid_version(), None);
        assert_eq!(with_version("v2.1.3").invalid_version(), None);
        assert_eq!(with_version("1.0").invalid_version(), Some("1.0"));
        assert_eq!(ArtifactMetadata::default().invalid_version(), None);
    }
}
