//! On-disk fixtures for sync tests.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::constants::DEFAULT_MANIFEST_PATH;

/// A temporary resource repository.
///
/// The directory is removed when the fixture is dropped.
#[derive(Debug)]
pub struct RepoFixture {
    temp_dir: TempDir,
}

impl RepoFixture {
    /// Create an empty repository.
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new().context("Failed to create temp repository")?;
        Ok(Self {
            temp_dir,
        })
    }

    /// Repository root.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of a repository-relative path.
    pub fn join(&self, relative: &str) -> PathBuf {
        self.path().join(relative)
    }

    /// Write `content` to `relative`, creating directories as needed.
    pub fn add_file(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Write a Markdown artifact whose frontmatter declares `dependencies`
    /// as `(category, path)` pairs.
    pub fn add_artifact(&self, relative: &str, dependencies: &[(&str, &str)], body: &str) -> Result<PathBuf> {
        let mut content = String::from("---\n");
        if !dependencies.is_empty() {
            content.push_str("dependencies:\n");
            let mut categories: Vec<&str> = Vec::new();
            for (category, _) in dependencies {
                if !categories.contains(category) {
                    categories.push(*category);
                }
            }
            for category in categories {
                content.push_str(&format!("  {category}:\n"));
                for (_, path) in dependencies.iter().filter(|(c, _)| *c == category) {
                    content.push_str(&format!("    - path: \"{path}\"\n"));
                }
            }
        }
        content.push_str("---\n");
        content.push_str(body);
        self.add_file(relative, &content)
    }

    /// Create an axis value file such as
    /// `snippets/best-practices/python-best-practices.md`.
    pub fn add_language(&self, language: &str) -> Result<PathBuf> {
        self.add_file(
            &format!("snippets/best-practices/{language}-best-practices.md"),
            &format!("# {language} best practices\n"),
        )
    }

    /// Create a framework axis value file.
    pub fn add_framework(&self, framework: &str) -> Result<PathBuf> {
        self.add_file(&format!("snippets/frameworks/{framework}.md"), &format!("# {framework}\n"))
    }

    /// Write the manifest at its default location.
    pub fn write_manifest(&self, content: &str) -> Result<PathBuf> {
        self.add_file(DEFAULT_MANIFEST_PATH, content)
    }

    /// Read the manifest at its default location.
    pub fn read_manifest(&self) -> Result<String> {
        self.read_file(DEFAULT_MANIFEST_PATH)
    }

    /// Read a repository file.
    pub fn read_file(&self, relative: &str) -> Result<String> {
        let path = self.join(relative);
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
    }

    /// Whether `relative` exists.
    pub fn file_exists(&self, relative: &str) -> bool {
        self.join(relative).exists()
    }
}

/// Sample manifests.
#[derive(Clone, Debug)]
pub struct ManifestFixture {
    /// Fixture name.
    pub name: String,
    /// Manifest text.
    pub content: String,
}

impl ManifestFixture {
    /// A manifest with preserved sections around both regenerated ones.
    pub fn with_preserved_sections() -> Self {
        Self {
            name: "with_preserved_sections".to_string(),
            content: r#"# Example dependencies for agpm
[sources]
community = "https://github.com/example-org/agpm-community.git"

[agents]
outdated-agent = { path = "claude-code/agents/outdated-agent.md" }

[hooks]
# Hooks are curated by hand.
pre-commit = { path = "claude-code/hooks/pre-commit.json" } # runs before commit

[commands]
outdated-command = { path = "claude-code/commands/outdated-command.md" }

[mcp-servers]
# MCP servers stay as they are.
filesystem = { path = "claude-code/mcp-servers/filesystem.json", tool = "claude-code" }
"#
            .to_string(),
        }
    }

    /// A manifest that is not valid TOML.
    pub fn invalid_syntax() -> Self {
        Self {
            name: "invalid_syntax".to_string(),
            content: "[agents\nbroken = {\n".to_string(),
        }
    }
}
