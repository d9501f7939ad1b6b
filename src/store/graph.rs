//! Artist link graph

use crate::analysis::AnalyzedArticle;
use crate::error::{ArchiveError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use tracing::info;

/// Opaque reference to a stored node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeHandle(pub usize);

/// Destination for confirmed articles and the links between them
pub trait GraphStore: Send {
    /// Add an article, or return the existing node for the same URL
    fn add_node(&mut self, article: &AnalyzedArticle) -> Result<NodeHandle>;

    /// Record that `source` links to `dest`
    fn add_edge(&mut self, source: NodeHandle, dest: NodeHandle) -> Result<()>;

    fn clear(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub title: String,
    pub url: String,
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
}

/// Serializable copy of the whole graph, edges keyed by article URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// In-memory graph, exported to JSON at the end of a crawl
#[derive(Debug, Default)]
pub struct MemoryGraphStore {
    nodes: Vec<GraphNode>,
    by_url: HashMap<String, NodeHandle>,
    edges: BTreeSet<(NodeHandle, NodeHandle)>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, handle: NodeHandle) -> Option<&GraphNode> {
        self.nodes.get(handle.0)
    }

    pub fn find(&self, url: &str) -> Option<NodeHandle> {
        self.by_url.get(url).copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn has_edge(&self, source: NodeHandle, dest: NodeHandle) -> bool {
        self.edges.contains(&(source, dest))
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes.clone(),
            edges: self
                .edges
                .iter()
                .map(|(source, dest)| GraphEdge {
                    source: self.nodes[source.0].url.clone(),
                    target: self.nodes[dest.0].url.clone(),
                })
                .collect(),
        }
    }

    /// Write the snapshot as pretty JSON
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.snapshot())?;
        fs::write(path, json)?;

        info!(
            "Saved graph with {} nodes and {} edges to {}",
            self.node_count(),
            self.edge_count(),
            path.display()
        );
        Ok(())
    }
}

impl GraphStore for MemoryGraphStore {
    fn add_node(&mut self, article: &AnalyzedArticle) -> Result<NodeHandle> {
        if let Some(&handle) = self.by_url.get(&article.url) {
            return Ok(handle);
        }

        let handle = NodeHandle(self.nodes.len());
        self.nodes.push(GraphNode {
            title: article.title.clone(),
            url: article.url.clone(),
            attributes: article.attributes.clone(),
        });
        self.by_url.insert(article.url.clone(), handle);
        Ok(handle)
    }

    fn add_edge(&mut self, source: NodeHandle, dest: NodeHandle) -> Result<()> {
        for handle in [source, dest] {
            if handle.0 >= self.nodes.len() {
                return Err(ArchiveError::Graph(format!("unknown node {}", handle.0)));
            }
        }
        self.edges.insert((source, dest));
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.nodes.clear();
        self.by_url.clear();
        self.edges.clear();
        Ok(())
    }
}
