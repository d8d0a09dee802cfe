//! Lexical dependency path resolution.
//!
//! Declared paths are relative to the directory of the declaring file.
//! Resolution never touches the filesystem, so a target that does not exist
//! still resolves to a canonical path.

use crate::core::Dependency;
use crate::metadata::ArtifactMetadata;
use crate::templating::contains_placeholder;

/// Resolve `raw` against the directory of `declared_by`.
///
/// Returns `None` when `raw` contains a template placeholder; such a path
/// cannot be determined statically.
///
/// A leading `/` makes the path relative to the repository root. Backslash
/// separators are accepted and normalised to `/`.
///
/// # Examples
///
/// ```rust
/// use agpm_sync::resolver::resolve_dependency;
///
/// assert_eq!(
///     resolve_dependency("claude-code/commands/y.md", "../../snippets/z.md").as_deref(),
///     Some("snippets/z.md")
/// );
/// assert_eq!(resolve_dependency("claude-code/commands/y.md", "../{{ language }}.md"), None);
/// ```
pub fn resolve_dependency(declared_by: &str, raw: &str) -> Option<String> {
    if contains_placeholder(raw) {
        return None;
    }

    let raw = raw.replace('\\', "/");
    if let Some(rooted) = raw.strip_prefix('/') {
        return Some(normalize(rooted));
    }

    let directory = declared_by.rsplit_once('/').map_or("", |(dir, _)| dir);
    Some(normalize(&format!("{directory}/{raw}")))
}

/// Remove `.` and empty segments and fold `..` into the preceding segment.
///
/// A `..` with nothing left to pop is kept, so a path that climbs above the
/// repository root stays distinguishable from every artifact path.
pub fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    segments.join("/")
}

/// Turn an artifact's declared dependencies into [`Dependency`] edges.
pub fn dependencies_of(declared_by: &str, metadata: &ArtifactMetadata) -> Vec<Dependency> {
    metadata
        .iter_dependencies()
        .map(|(category, spec)| Dependency {
            declared_by: declared_by.to_string(),
            raw_path: spec.path.clone(),
            target: resolve_dependency(declared_by, &spec.path),
            category,
            name: spec.name.clone(),
            tool: spec.tool.clone(),
            install: spec.install,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{DependencyCategory, DependencySpec};
    use std::collections::BTreeMap;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("a/./b/../c.md"), "a/c.md");
        assert_eq!(normalize("a//b.md"), "a/b.md");
        assert_eq!(normalize("../a.md"), "../a.md");
        assert_eq!(normalize("a/../../b.md"), "../b.md");
        assert_eq!(normalize("../../a/../b.md"), "../../b.md");
        assert_eq!(normalize("a\\b\\c.md"), "a/b/c.md");
    }

    #[test]
    fn test_resolve_relative_to_declaring_directory() {
        assert_eq!(
            resolve_dependency("claude-code/agents/x.md", "helper.md").as_deref(),
            Some("claude-code/agents/helper.md")
        );
        assert_eq!(
            resolve_dependency("claude-code/agents/x.md", "./nested/../helper.md").as_deref(),
            Some("claude-code/agents/helper.md")
        );
        assert_eq!(
            resolve_dependency("claude-code/agents/x.md", "../../snippets/agents/a.md").as_deref(),
            Some("snippets/agents/a.md")
        );
    }

    #[test]
    fn test_resolve_above_root_stays_outside() {
        assert_eq!(
            resolve_dependency("claude-code/agents/x.md", "../../../snippets/z.md").as_deref(),
            Some("../snippets/z.md")
        );
    }

    #[test]
    fn test_resolve_rooted_and_windows_paths() {
        assert_eq!(
            resolve_dependency("claude-code/agents/x.md", "/snippets/z.md").as_deref(),
            Some("snippets/z.md")
        );
        assert_eq!(
            resolve_dependency("claude-code/agents/x.md", "..\\..\\snippets\\z.md").as_deref(),
            Some("snippets/z.md")
        );
    }

    #[test]
    fn test_placeholder_paths_are_unresolvable() {
        assert_eq!(
            resolve_dependency(
                "claude-code/agents/x.md",
                "../../snippets/best-practices/{{ agpm.project.language }}-best-practices.md"
            ),
            None
        );
    }

    #[test]
    fn test_dependencies_of() {
        let spec = |path: &str| DependencySpec {
            path: path.to_string(),
            name: Some("dep".to_string()),
            tool: None,
            install: Some(false),
            version: None,
        };
        let metadata = ArtifactMetadata {
            dependencies: Some(BTreeMap::from([(
                DependencyCategory::Snippets,
                vec![spec("../../snippets/z.md"), spec("../../snippets/{{language}}.md")],
            )])),
            agpm: None,
        };

        let deps = dependencies_of("claude-code/commands/y.md", &metadata);
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].target.as_deref(), Some("snippets/z.md"));
        assert_eq!(deps[0].install, Some(false));
        assert!(deps[1].is_unresolvable());
        assert_eq!(deps[1].declared_by, "claude-code/commands/y.md");
    }
}
