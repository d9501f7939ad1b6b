//! Classification cache: title -> "is a musical artist"

use crate::error::{ArchiveError, Result};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Remembers classification results so articles are analysed at most once
pub trait ClassificationCache: Send + Sync {
    /// `None` when the title has never been classified
    fn get(&self, title: &str) -> Result<Option<bool>>;

    fn put(&self, title: &str, is_target: bool) -> Result<()>;

    /// Forget everything (called when a fresh crawl starts)
    fn clear(&self) -> Result<()>;

    /// Persist pending writes, for implementations that buffer them
    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// Process-local cache
#[derive(Debug, Default)]
pub struct MemoryClassificationCache {
    entries: RwLock<HashMap<String, bool>>,
}

impl MemoryClassificationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl ClassificationCache for MemoryClassificationCache {
    fn get(&self, title: &str) -> Result<Option<bool>> {
        Ok(self.entries.read().get(title).copied())
    }

    fn put(&self, title: &str, is_target: bool) -> Result<()> {
        self.entries.write().insert(title.to_string(), is_target);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.entries.write().clear();
        Ok(())
    }
}

/// Cache backed by a JSON file so classifications survive between crawls.
///
/// Writes are buffered and flushed every `flush_interval` puts, on `clear`,
/// and on explicit [`ClassificationCache::flush`].
#[derive(Debug)]
pub struct FileClassificationCache {
    path: PathBuf,
    entries: RwLock<HashMap<String, bool>>,
    pending: Mutex<usize>,
    flush_interval: usize,
}

impl FileClassificationCache {
    pub const DEFAULT_FLUSH_INTERVAL: usize = 100;

    /// Open the cache file, starting empty if it does not exist yet
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let entries: HashMap<String, bool> = if path.exists() {
            let data = fs::read_to_string(&path)?;
            serde_json::from_str(&data)?
        } else {
            HashMap::new()
        };

        info!(
            "Opened classification cache {} with {} entries",
            path.display(),
            entries.len()
        );

        Ok(Self {
            path,
            entries: RwLock::new(entries),
            pending: Mutex::new(0),
            flush_interval: Self::DEFAULT_FLUSH_INTERVAL,
        })
    }

    pub fn with_flush_interval(mut self, interval: usize) -> Self {
        self.flush_interval = interval.max(1);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn write_file(&self, entries: &HashMap<String, bool>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let data = serde_json::to_string(entries)?;
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, data)
            .and_then(|_| fs::rename(&temp_path, &self.path))
            .map_err(|e| {
                ArchiveError::Cache(format!("failed to write {}: {}", self.path.display(), e))
            })?;

        debug!("Flushed {} classifications to {}", entries.len(), self.path.display());
        *self.pending.lock() = 0;
        Ok(())
    }
}

impl ClassificationCache for FileClassificationCache {
    fn get(&self, title: &str) -> Result<Option<bool>> {
        Ok(self.entries.read().get(title).copied())
    }

    fn put(&self, title: &str, is_target: bool) -> Result<()> {
        let entries = {
            let mut entries = self.entries.write();
            entries.insert(title.to_string(), is_target);

            let mut pending = self.pending.lock();
            *pending += 1;
            if *pending < self.flush_interval {
                return Ok(());
            }
            entries.clone()
        };
        self.write_file(&entries)
    }

    fn clear(&self) -> Result<()> {
        self.entries.write().clear();
        self.write_file(&HashMap::new())
    }

    fn flush(&self) -> Result<()> {
        let entries = self.entries.read().clone();
        self.write_file(&entries)
    }
}
