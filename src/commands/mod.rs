//! Subcommand implementations

mod build_index;
mod crawl;
mod extract;
mod locate;

pub use build_index::build_index;
pub use crawl::run_crawl;
pub use extract::extract_range;
pub use locate::locate_article;

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};
use wikigraph::{
    analysis::ContentAnalyzer,
    archive::{ArchiveIndex, Bz2RangeReader},
    config::Config,
    store::ClassificationCache,
    RecordLocator,
};

/// Persisted index if present, otherwise parse the index file
pub(crate) fn load_index(config: &Config) -> Result<ArchiveIndex> {
    let persisted = &config.archive.persisted_index_path;
    if persisted.exists() {
        match ArchiveIndex::load(persisted) {
            Ok(index) => return Ok(index),
            Err(e) => warn!(
                "Ignoring unreadable index {}: {}",
                persisted.display(),
                e
            ),
        }
    }

    info!(
        "No persisted index at {}, parsing {} (run build-index to skip this)",
        persisted.display(),
        config.archive.index_path.display()
    );
    let index_path: &Path = &config.archive.index_path;
    ArchiveIndex::from_index_file(index_path, |_| {})
        .with_context(|| format!("Failed to read index file '{}'", index_path.display()))
}

pub(crate) fn open_locator<C: ClassificationCache>(
    config: &Config,
    cache: C,
) -> Result<RecordLocator<Bz2RangeReader, C>> {
    let index = load_index(config)?;
    let reader = Bz2RangeReader::new(&config.archive.archive_path).with_context(|| {
        format!(
            "Failed to open archive '{}'",
            config.archive.archive_path.display()
        )
    })?;
    let analyzer = ContentAnalyzer::new(config.archive.base_url.clone());
    Ok(RecordLocator::new(index, reader, analyzer, cache))
}
