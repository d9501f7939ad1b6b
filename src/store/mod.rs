//! Classification cache and link graph backends

pub mod cache;
pub mod graph;

pub use cache::{ClassificationCache, FileClassificationCache, MemoryClassificationCache};
pub use graph::{GraphEdge, GraphNode, GraphSnapshot, GraphStore, MemoryGraphStore, NodeHandle};
