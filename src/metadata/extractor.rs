//! Extract dependency metadata from artifact files.
//!
//! Markdown artifacts carry YAML frontmatter between `---` lines; JSON
//! artifacts (hooks, MCP servers) carry the same `dependencies`/`agpm`
//! fields at the top level of the document. Other files have no metadata.
//!
//! By convention the metadata block always opens on the first line of a
//! Markdown file and closes within the first `max_lines` lines, so only that
//! prefix is ever inspected.

use crate::metadata::ArtifactMetadata;

/// Outcome of looking for metadata in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// No metadata block. The artifact simply has no dependencies.
    Missing,
    /// A block was found and parsed.
    Parsed(ArtifactMetadata),
    /// A block was found but could not be parsed; carries the reason.
    Malformed(String),
}

/// Metadata extractor for artifact files.
#[derive(Debug, Clone, Copy)]
pub struct FrontmatterExtractor {
    max_lines: usize,
}

impl FrontmatterExtractor {
    /// Create an extractor that looks for the closing marker within
    /// `max_lines` lines of the start of the file.
    pub fn new(max_lines: usize) -> Self {
        Self {
            max_lines,
        }
    }

    /// Extract metadata from a file's content, dispatching on the extension
    /// of `path`.
    pub fn extract(&self, path: &str, content: &str) -> Extraction {
        let extension = path.rsplit_once('.').map_or("", |(_, ext)| ext);

        match extension {
            "md" => self.extract_markdown_frontmatter(content),
            "json" => Self::extract_json_fields(content),
            _ => Extraction::Missing,
        }
    }

    /// Locate and parse YAML frontmatter.
    fn extract_markdown_frontmatter(&self, content: &str) -> Extraction {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        // `lines()` also strips the `\r` of CRLF endings.
        let mut lines = content.lines().take(self.max_lines);

        match lines.next() {
            Some(first) if first.trim_end() == "---" => {}
            _ => return Extraction::Missing,
        }

        let mut block = Vec::new();
        let mut closed = false;
        for line in lines {
            if line.trim_end() == "---" {
                closed = true;
                break;
            }
            block.push(line);
        }

        if !closed {
            return Extraction::Malformed(format!(
                "frontmatter is not closed within the first {} lines",
                self.max_lines
            ));
        }

        let frontmatter = block.join("\n");
        if frontmatter.trim().is_empty() {
            return Extraction::Parsed(ArtifactMetadata::default());
        }

        match serde_yaml::from_str::<ArtifactMetadata>(&frontmatter) {
            Ok(metadata) => Extraction::Parsed(metadata),
            Err(e) => {
                tracing::debug!("Unable to parse YAML frontmatter: {e}");
                Extraction::Malformed(e.to_string())
            }
        }
    }

    /// Read `dependencies` and `agpm` from the top-level JSON object.
    fn extract_json_fields(content: &str) -> Extraction {
        match serde_json::from_str::<ArtifactMetadata>(content) {
            Ok(metadata) => Extraction::Parsed(metadata),
            Err(e) => {
                tracing::debug!("Unable to parse JSON metadata: {e}");
                Extraction::Malformed(e.to_string())
            }
        }
    }
}

impl Default for FrontmatterExtractor {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_FRONTMATTER_MAX_LINES)
    }
}
