//! Bounded parallel file reads.

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use std::path::Path;

use crate::core::SyncError;
use crate::utils::progress::ProgressBar;

/// Read every root-relative path in `paths` with at most `parallelism` reads
/// in flight.
///
/// Results are returned sorted by path regardless of completion order.
/// Invalid UTF-8 is replaced rather than rejected; the content is only
/// searched for metadata and placeholders.
///
/// # Errors
///
/// The first file that cannot be read aborts the whole batch with
/// [`SyncError::ArtifactUnreadable`].
pub async fn read_files_parallel(
    root: &Path,
    paths: &[String],
    parallelism: usize,
    progress: Option<&ProgressBar>,
) -> Result<Vec<(String, String)>> {
    if paths.is_empty() {
        return Ok(Vec::new());
    }

    let mut reads = stream::iter(paths.iter().cloned())
        .map(|relative| {
            let full = root.join(&relative);
            tokio::task::spawn_blocking(move || {
                let result = std::fs::read(&full);
                (relative, result)
            })
        })
        .buffer_unordered(parallelism.max(1));

    let mut contents = Vec::with_capacity(paths.len());
    while let Some(joined) = reads.next().await {
        let (relative, result) = joined.context("File read task panicked")?;
        let bytes = result.map_err(|e| SyncError::ArtifactUnreadable {
            path: relative.clone(),
            reason: e.to_string(),
        })?;
        if let Some(progress) = progress {
            progress.inc(1);
        }
        contents.push((relative, String::from_utf8_lossy(&bytes).into_owned()));
    }

    contents.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_files_parallel_sorted() {
        let temp = TempDir::new().unwrap();
        let mut paths = Vec::new();
        for i in (0..20).rev() {
            let name = format!("file{i:02}.md");
            std::fs::write(temp.path().join(&name), format!("content {i}")).unwrap();
            paths.push(name);
        }

        let contents = read_files_parallel(temp.path(), &paths, 4, None).await.unwrap();
        assert_eq!(contents.len(), 20);
        assert_eq!(contents[0], ("file00.md".to_string(), "content 0".to_string()));
        assert!(contents.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[tokio::test]
    async fn test_missing_file_aborts() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.md"), "a").unwrap();
        let paths = vec!["a.md".to_string(), "gone.md".to_string()];

        let err = read_files_parallel(temp.path(), &paths, 2, None).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SyncError>(),
            Some(SyncError::ArtifactUnreadable { path, .. }) if path == "gone.md"
        ));
    }

    #[tokio::test]
    async fn test_empty_input() {
        let temp = TempDir::new().unwrap();
        assert!(read_files_parallel(temp.path(), &[], 4, None).await.unwrap().is_empty());
    }
}
