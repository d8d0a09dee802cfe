//! Canonical path helpers.
//!
//! Artifact identities are repository-relative strings with `/` separators on
//! every platform. These helpers convert host paths into that form and
//! compute relative paths between canonical paths without touching the
//! filesystem.

use std::path::{Component, Path};

/// Join the normal components of `path` with `/`.
///
/// `.` components are dropped; non-UTF-8 components are converted lossily.
#[must_use]
pub fn to_forward_slash(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Path of `target` relative to the directory `from_dir`.
///
/// Both arguments are canonical repository-relative paths.
///
/// ```rust
/// use agpm_sync::utils::fs::relative_path;
///
/// assert_eq!(relative_path("examples/deps", "claude-code/agents/x.md"), "../../claude-code/agents/x.md");
/// assert_eq!(relative_path("", "claude-code/agents/x.md"), "claude-code/agents/x.md");
/// ```
#[must_use]
pub fn relative_path(from_dir: &str, target: &str) -> String {
    let from: Vec<&str> = from_dir.split('/').filter(|s| !s.is_empty()).collect();
    let to: Vec<&str> = target.split('/').filter(|s| !s.is_empty()).collect();

    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();
    let mut parts: Vec<&str> = vec![".."; from.len() - common];
    parts.extend(&to[common..]);
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_to_forward_slash() {
        let path: PathBuf = ["claude-code", "agents", "x.md"].iter().collect();
        assert_eq!(to_forward_slash(&path), "claude-code/agents/x.md");
        assert_eq!(to_forward_slash(Path::new("./snippets/z.md")), "snippets/z.md");
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(relative_path("examples/deps", "examples/deps/x.md"), "x.md");
        assert_eq!(relative_path("examples/deps", "examples/other/x.md"), "../other/x.md");
        assert_eq!(relative_path("a", "b/c.md"), "../b/c.md");
    }
}
