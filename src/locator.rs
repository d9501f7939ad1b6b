//! Title to analyzed article, end to end

use crate::analysis::{AnalyzedArticle, ContentAnalyzer};
use crate::archive::{isolate_record, ArchiveIndex, BlockReader, IsolatedRecord};
use crate::error::Result;
use crate::store::ClassificationCache;
use tracing::{debug, warn};

/// Combines the index, the range reader, the record scan and the analyzer.
///
/// Every call reads exactly one block from the archive; nothing is kept
/// between calls except what the classification cache records.
pub struct RecordLocator<R, C> {
    index: ArchiveIndex,
    reader: R,
    analyzer: ContentAnalyzer,
    cache: C,
}

impl<R: BlockReader, C: ClassificationCache> RecordLocator<R, C> {
    pub fn new(index: ArchiveIndex, reader: R, analyzer: ContentAnalyzer, cache: C) -> Self {
        Self {
            index,
            reader,
            analyzer,
            cache,
        }
    }

    pub fn index(&self) -> &ArchiveIndex {
        &self.index
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn analyzer(&self) -> &ContentAnalyzer {
        &self.analyzer
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Reconstruct the `<page>` markup for `title`
    pub fn isolate(&self, title: &str) -> Result<IsolatedRecord> {
        let entry = self.index.lookup(title)?;
        debug!(
            "Reading block {}..{:?} for '{}' (id {})",
            entry.range.start, entry.range.end, title, entry.record_id
        );
        let block = self.reader.read_block(&entry.range)?;
        isolate_record(&block, entry)
    }

    /// Locate, analyze and classify `title`.
    ///
    /// The classification is written to the cache; a cache failure is logged
    /// and does not fail the lookup.
    pub fn locate(&self, title: &str) -> Result<AnalyzedArticle> {
        self.locate_with_record(title).map(|(article, _)| article)
    }

    /// [`RecordLocator::locate`], also handing back the isolated page
    pub fn locate_with_record(&self, title: &str) -> Result<(AnalyzedArticle, IsolatedRecord)> {
        let record = self.isolate(title)?;
        let body = record.body_text.as_deref().unwrap_or("");
        let article = self.analyzer.analyze(title, body);

        if let Err(e) = self.cache.put(title, article.is_target_category) {
            warn!("Failed to cache classification for '{}': {}", title, e);
        }

        Ok((article, record))
    }
}
