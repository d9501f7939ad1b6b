//! Archive and index locations

use crate::analysis::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// The `*-pages-articles-multistream.xml.bz2` dump
    pub archive_path: PathBuf,
    /// Companion `*-multistream-index.txt` (plain or `.bz2`)
    pub index_path: PathBuf,
    /// Where `build-index` writes the binary index and where the other
    /// commands look for it before falling back to `index_path`
    pub persisted_index_path: PathBuf,
    /// Prefix for article URLs
    pub base_url: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            archive_path: PathBuf::from(
                "data/input/enwiki-20200201-pages-articles-multistream.xml.bz2",
            ),
            index_path: PathBuf::from(
                "data/input/enwiki-20200201-pages-articles-multistream-index.txt",
            ),
            persisted_index_path: PathBuf::from("data/index/archive.idx"),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}
