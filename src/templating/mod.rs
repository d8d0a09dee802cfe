//! Template placeholder detection and axis value discovery.
//!
//! Artifacts are rendered by the installer with values such as
//! `{{ agpm.project.language }}`. This module never renders anything; it only
//! finds out which axes an artifact mentions and which values each axis can
//! take in this repository.
//!
//! # Placeholder syntax
//!
//! A placeholder is a double-brace expression holding a dotted identifier,
//! optionally followed by filters:
//!
//! ```text
//! {{ language }}
//! {{ agpm.project.language }}
//! {{ agpm.project.framework | default(value="none") }}
//! ```
//!
//! The axis name is the last segment of the identifier (`language`).
//!
//! # Value discovery
//!
//! Each configured [`AxisConfig`] names a directory and a file pattern with a
//! `{value}` token. The values of the axis are the tokens of every matching
//! file in that directory, sorted. A directory that does not exist yields an
//! axis with no values, which makes it unusable for expansion.

use anyhow::Result;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::LazyLock;

use crate::config::AxisConfig;
use crate::core::SyncError;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*)\s*(?:\|[^{}]*)?\}\}",
    )
    .expect("placeholder pattern is a valid regex")
});

/// Axis names referenced by placeholders in `text`.
pub fn placeholders_in(text: &str) -> BTreeSet<String> {
    PLACEHOLDER
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| m.as_str().rsplit('.').next())
        .map(str::to_string)
        .collect()
}

/// Whether `text` contains at least one placeholder.
pub fn contains_placeholder(text: &str) -> bool {
    PLACEHOLDER.is_match(text)
}

/// A template axis and the values discovered for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateAxis {
    /// Axis name.
    pub name: String,
    /// Discovered values, sorted.
    pub values: BTreeSet<String>,
}

impl TemplateAxis {
    /// An axis with no values cannot drive expansion.
    pub fn is_usable(&self) -> bool {
        !self.values.is_empty()
    }
}

/// Every configured axis with its discovered values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DiscoveredAxes(BTreeMap<String, TemplateAxis>);

impl DiscoveredAxes {
    /// Look up an axis by name.
    pub fn get(&self, name: &str) -> Option<&TemplateAxis> {
        self.0.get(name)
    }

    /// Iterate over axes in name order.
    pub fn iter(&self) -> impl Iterator<Item = &TemplateAxis> {
        self.0.values()
    }

    /// Restrict `names` to usable axes and return their values.
    ///
    /// Names that are not configured axes, and axes without values, are
    /// dropped.
    pub fn usable_values(&self, names: &BTreeSet<String>) -> BTreeMap<String, Vec<String>> {
        names
            .iter()
            .filter_map(|name| self.0.get(name))
            .filter(|axis| axis.is_usable())
            .map(|axis| (axis.name.clone(), axis.values.iter().cloned().collect()))
            .collect()
    }
}

impl FromIterator<TemplateAxis> for DiscoveredAxes {
    fn from_iter<I: IntoIterator<Item = TemplateAxis>>(iter: I) -> Self {
        Self(iter.into_iter().map(|axis| (axis.name.clone(), axis)).collect())
    }
}

/// Discover the values of one axis under `root`.
pub async fn discover_axis(root: &Path, axis: &AxisConfig) -> Result<TemplateAxis> {
    let directory = root.join(&axis.directory);
    let mut values = BTreeSet::new();

    let mut entries = match tokio::fs::read_dir(&directory).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("Axis '{}' directory {} does not exist", axis.name, directory.display());
            return Ok(TemplateAxis {
                name: axis.name.clone(),
                values,
            });
        }
        Err(e) => {
            return Err(SyncError::RootUnreadable {
                root: axis.directory.clone(),
                reason: e.to_string(),
            }
            .into());
        }
    };

    let unreadable = |e: std::io::Error| SyncError::RootUnreadable {
        root: axis.directory.clone(),
        reason: e.to_string(),
    };

    while let Some(entry) = entries.next_entry().await.map_err(unreadable)? {
        if !entry.file_type().await.map_err(unreadable)?.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        if let Some(value) = file_name.to_str().and_then(|name| axis.value_of(name)) {
            values.insert(value.to_string());
        }
    }

    tracing::debug!("Axis '{}' has {} values", axis.name, values.len());
    Ok(TemplateAxis {
        name: axis.name.clone(),
        values,
    })
}

/// Discover every configured axis concurrently.
pub async fn discover_axes(root: &Path, axes: &[AxisConfig]) -> Result<DiscoveredAxes> {
    let discovered =
        futures::future::try_join_all(axes.iter().map(|axis| discover_axis(root, axis))).await?;
    Ok(discovered.into_iter().collect())
}
