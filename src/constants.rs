//! Global constants used throughout agpm-sync.
//!
//! Defaults for [`SyncConfig`](crate::config::SyncConfig) live here so the
//! fixed conventions of an agpm resource repository are discoverable in one
//! place.

/// Default configuration file name, looked up in the repository root.
pub const CONFIG_FILE_NAME: &str = "agpm-sync.toml";

/// Default manifest location, relative to the repository root.
pub const DEFAULT_MANIFEST_PATH: &str = "examples/deps/agpm.toml";

/// Artifact patterns scanned when no configuration overrides them.
pub const DEFAULT_PATTERNS: &[&str] = &[
    "claude-code/agents/**/*.md",
    "claude-code/commands/**/*.md",
    "claude-code/hooks/*.json",
    "claude-code/mcp-servers/*.json",
    "opencode/agents/**/*.md",
    "opencode/commands/**/*.md",
    "opencode/mcp-servers/*.json",
    "snippets/**/*.md",
];

/// File names that are documentation, never artifacts.
pub const DEFAULT_EXCLUDED_FILES: &[&str] = &["README.md", "CLAUDE.md", "AGENTS.md"];

/// Extensions an artifact may have.
pub const ARTIFACT_EXTENSIONS: &[&str] = &["md", "json"];

/// First path segment of the shared library tree.
pub const DEFAULT_LIBRARY_PREFIX: &str = "snippets";

/// Metadata never begins after the first line and always closes within this
/// many lines.
pub const DEFAULT_FRONTMATTER_MAX_LINES: usize = 200;

/// Axis every role-restricted expansion strategy keys on.
pub const DEFAULT_PRIMARY_AXIS: &str = "language";

/// Namespace under which axis values are nested in `template_vars`.
pub const DEFAULT_TEMPLATE_NAMESPACE: &str = "project";

/// Prefix of secondary-tool entry names.
pub const DEFAULT_SECONDARY_PREFIX: &str = "opencode-";

/// Token in an axis `file_pattern` that stands for the axis value.
pub const AXIS_VALUE_TOKEN: &str = "{value}";

/// Separator between a base name and its axis values.
pub const VARIANT_SEPARATOR: &str = "-";

/// First line of every regenerated section body.
pub const GENERATED_HEADER_COMMENT: &str =
    "# Generated by agpm-sync from top-level artifacts. Do not edit by hand.";

/// Minimum number of parallel reads regardless of CPU count.
pub const MIN_PARALLELISM: usize = 10;

/// Multiplier applied to CPU core count for default parallelism.
pub const PARALLELISM_CORE_MULTIPLIER: usize = 2;

/// Default CPU core count when detection fails.
pub const FALLBACK_CORE_COUNT: usize = 4;

/// Default number of concurrent file reads.
pub fn default_parallelism() -> usize {
    let cores =
        std::thread::available_parallelism().map(std::num::NonZero::get).unwrap_or(FALLBACK_CORE_COUNT);
    (cores * PARALLELISM_CORE_MULTIPLIER).max(MIN_PARALLELISM)
}
