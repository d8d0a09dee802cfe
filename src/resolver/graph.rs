//! Dependency graph and top-level set.
//!
//! Nodes are canonical paths: every scanned artifact plus every resolved
//! dependency target, whether or not the target exists. An edge `a -> b`
//! means `a` declares a dependency on `b`.
//!
//! The top-level set is `AllArtifacts - ReferencedPaths`, where a path is
//! referenced when it has at least one incoming edge. No cycle detection is
//! needed: two artifacts that reference each other are both referenced and
//! neither is top-level.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::core::{Artifact, Bucket, Diagnostic, Diagnostics, ToolCategory};
use crate::metadata::DependencyCategory;

/// Graph of artifacts and the paths they reference.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// The underlying directed graph. Edge weights record the declared
    /// category.
    graph: DiGraph<String, DependencyCategory>,
    /// Map from canonical paths to their graph indices.
    node_map: HashMap<String, NodeIndex>,
    /// Scanned artifacts by path.
    artifacts: BTreeMap<String, Artifact>,
}

impl DependencyGraph {
    /// Fold every artifact's resolved dependencies into a graph.
    ///
    /// Unresolvable dependencies and references to paths that were not
    /// scanned are reported as diagnostics.
    pub fn build(artifacts: impl IntoIterator<Item = Artifact>) -> (Self, Diagnostics) {
        let mut graph = Self::default();
        let mut diagnostics = Diagnostics::new();

        for artifact in artifacts {
            graph.ensure_node(&artifact.path);
            graph.artifacts.insert(artifact.path.clone(), artifact);
        }

        let mut edges = Vec::new();
        for artifact in graph.artifacts.values() {
            for dependency in &artifact.dependencies {
                match &dependency.target {
                    Some(target) => {
                        edges.push((artifact.path.clone(), target.clone(), dependency.category));
                    }
                    None => diagnostics.push(Diagnostic::UnresolvablePath {
                        path: artifact.path.clone(),
                        dependency: dependency.raw_path.clone(),
                    }),
                }
            }
        }

        for (from, to, category) in edges {
            if !graph.artifacts.contains_key(&to) {
                diagnostics.push(Diagnostic::DanglingReference {
                    path: from.clone(),
                    target: to.clone(),
                });
            }
            let from_idx = graph.ensure_node(&from);
            let to_idx = graph.ensure_node(&to);
            graph.graph.add_edge(from_idx, to_idx, category);
        }

        tracing::debug!(
            "Built dependency graph: {} artifacts, {} nodes, {} edges",
            graph.artifacts.len(),
            graph.graph.node_count(),
            graph.graph.edge_count()
        );

        (graph, diagnostics)
    }

    fn ensure_node(&mut self, path: &str) -> NodeIndex {
        if let Some(&index) = self.node_map.get(path) {
            index
        } else {
            let index = self.graph.add_node(path.to_string());
            self.node_map.insert(path.to_string(), index);
            index
        }
    }

    /// Every scanned artifact in path order.
    pub fn all_artifacts(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.values()
    }

    /// Look up an artifact by canonical path.
    pub fn artifact(&self, path: &str) -> Option<&Artifact> {
        self.artifacts.get(path)
    }

    /// Number of scanned artifacts.
    pub fn artifact_count(&self) -> usize {
        self.artifacts.len()
    }

    /// Paths with at least one incoming edge, including dangling targets.
    pub fn referenced_paths(&self) -> BTreeSet<&str> {
        self.graph
            .node_indices()
            .filter(|&idx| self.graph.neighbors_directed(idx, Direction::Incoming).next().is_some())
            .map(|idx| self.graph[idx].as_str())
            .collect()
    }

    /// Artifacts that declare a dependency on `path`.
    pub fn referrers(&self, path: &str) -> BTreeSet<&str> {
        self.node_map
            .get(path)
            .map(|&idx| {
                self.graph
                    .neighbors_directed(idx, Direction::Incoming)
                    .map(|from| self.graph[from].as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Referenced paths that are not scanned artifacts.
    pub fn dangling_references(&self) -> BTreeSet<&str> {
        self.referenced_paths()
            .into_iter()
            .filter(|path| !self.artifacts.contains_key(*path))
            .collect()
    }

    /// Artifacts nothing points at, in path order.
    pub fn top_level(&self) -> Vec<&Artifact> {
        let all: BTreeSet<&str> = self.artifacts.keys().map(String::as_str).collect();
        let referenced = self.referenced_paths();
        all.difference(&referenced).filter_map(|path| self.artifacts.get(*path)).collect()
    }
}

/// Partition top-level artifacts by `(tool, kind)`.
///
/// Library artifacts are dropped entirely. Each bucket keeps path order.
pub fn bucket_top_level<'a>(
    top_level: impl IntoIterator<Item = &'a Artifact>,
) -> BTreeMap<Bucket, Vec<&'a Artifact>> {
    let mut buckets: BTreeMap<Bucket, Vec<&Artifact>> = BTreeMap::new();
    for artifact in top_level {
        if artifact.tool == ToolCategory::Library {
            continue;
        }
        buckets.entry(artifact.bucket()).or_default().push(artifact);
    }
    buckets
}
