//! Crawl limits and output locations

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Seed titles, one per line (`artist_title` header allowed)
    pub seed_path: PathBuf,
    /// Articles at this depth are kept but not expanded
    pub max_depth: usize,
    /// Stop once this many artists are in the graph
    pub max_articles: usize,
    /// Classification cache file
    pub cache_path: PathBuf,
    /// Graph snapshot output
    pub graph_path: PathBuf,
    /// Puts between cache flushes
    pub cache_flush_interval: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            seed_path: PathBuf::from("data/input/seed_list.csv"),
            max_depth: 2,
            max_articles: 1000,
            cache_path: PathBuf::from("data/output/classifications.json"),
            graph_path: PathBuf::from("data/output/graph.json"),
            cache_flush_interval: 100,
        }
    }
}
