//! Rendering of regenerated section bodies.
//!
//! Each entry is one line holding an inline table:
//!
//! ```toml
//! backend-engineer-python-django = { path = "claude-code/agents/backend-engineer.md", filename = "backend-engineer-python-django.md", template_vars = { project = { language = "python", framework = "django" } } }
//! opencode-reviewer = { path = "opencode/agents/reviewer.md", tool = "opencode" }
//! ```
//!
//! Keys and string values go through `toml_edit` so quoting and escaping are
//! always valid TOML: keys stay bare when they can be.

use std::collections::BTreeMap;

use crate::config::ManifestConfig;
use crate::constants::GENERATED_HEADER_COMMENT;
use crate::core::{ArtifactKind, Bucket, ToolCategory};
use crate::manifest::document::LineEnding;
use crate::utils::fs::relative_path;
use crate::variants::VariantEntry;

/// Tools whose entries are written, in output order.
const MANIFEST_TOOLS: [ToolCategory; 2] = [ToolCategory::ClaudeCode, ToolCategory::OpenCode];

fn toml_key(key: &str) -> String {
    toml_edit::Key::new(key).to_string().trim().to_string()
}

fn toml_string(value: &str) -> String {
    toml_edit::Value::from(value).to_string().trim().to_string()
}

fn inline_table(fields: &[(String, String)]) -> String {
    if fields.is_empty() {
        return "{}".to_string();
    }
    let body: Vec<String> = fields.iter().map(|(key, value)| format!("{key} = {value}")).collect();
    format!("{{ {} }}", body.join(", "))
}

/// Renders entries and section bodies.
#[derive(Debug, Clone)]
pub struct EntryRenderer {
    namespace: String,
    source: Option<String>,
    base_dir: Option<String>,
}

impl EntryRenderer {
    /// Renderer for the given manifest settings.
    ///
    /// `manifest_dir` is the manifest's directory relative to the repository
    /// root; it only matters when paths are written relative to the manifest.
    pub fn new(config: &ManifestConfig, namespace: impl Into<String>, manifest_dir: &str) -> Self {
        Self {
            namespace: namespace.into(),
            source: config.source.clone(),
            base_dir: config.relative_to_manifest.then(|| manifest_dir.to_string()),
        }
    }

    /// One `name = { ... }` line, without terminator.
    pub fn render_entry(&self, entry: &VariantEntry) -> String {
        let mut fields = Vec::new();

        if let Some(source) = &self.source {
            fields.push(("source".to_string(), toml_string(source)));
        }

        let path = match &self.base_dir {
            Some(dir) => relative_path(dir, &entry.artifact_path),
            None => entry.artifact_path.clone(),
        };
        fields.push(("path".to_string(), toml_string(&path)));

        if let Some(tool) = entry.bucket.tool.manifest_tag() {
            fields.push(("tool".to_string(), toml_string(tool)));
        }

        if let Some(filename) = entry.filename() {
            fields.push(("filename".to_string(), toml_string(&filename)));
        }

        if entry.is_variant() {
            let values: Vec<(String, String)> = entry
                .axis_values
                .iter()
                .map(|(axis, value)| (toml_key(axis), toml_string(value)))
                .collect();
            let namespaced = vec![(toml_key(&self.namespace), inline_table(&values))];
            fields.push(("template_vars".to_string(), inline_table(&namespaced)));
        }

        format!("{} = {}", toml_key(&entry.name), inline_table(&fields))
    }

    /// Body lines of a regenerated section holding `kinds`.
    ///
    /// `followed` adds a trailing blank line separating the body from the
    /// next header.
    pub fn render_section_body(
        &self,
        kinds: &[ArtifactKind],
        entries: &BTreeMap<Bucket, Vec<VariantEntry>>,
        line_ending: LineEnding,
        followed: bool,
    ) -> Vec<String> {
        let eol = line_ending.as_str();
        let mut lines = vec![format!("{GENERATED_HEADER_COMMENT}{eol}")];

        for (index, tool) in MANIFEST_TOOLS.into_iter().enumerate() {
            if index > 0 {
                lines.push(eol.to_string());
                lines.push(format!("# {} resources{eol}", tool.display_name()));
            }

            let mut first_group = true;
            for &kind in kinds {
                let Some(group) = entries.get(&Bucket { tool, kind }).filter(|g| !g.is_empty()) else {
                    continue;
                };
                if !first_group {
                    lines.push(eol.to_string());
                }
                first_group = false;

                lines.push(format!("# {} {}{eol}", tool.display_name(), kind.plural()));
                lines.extend(group.iter().map(|entry| format!("{}{eol}", self.render_entry(entry))));
            }
        }

        if followed {
            lines.push(eol.to_string());
        }
        lines
    }
}
