//! Archive index: title and page id to compressed block range
//!
//! Wikipedia publishes a companion index for every multistream dump with one
//! `offset:page_id:title` line per article. Every article inside the same bzip2
//! stream shares the stream's starting offset, so the end of a block is simply
//! the next distinct offset in the file (or end of file for the last stream).

use crate::error::{ArchiveError, Result};
use bzip2::read::MultiBzDecoder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Byte range of one compressed block in the archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockRange {
    /// Offset of the first byte of the bzip2 stream
    pub start: u64,
    /// Offset one past the last byte, or `None` when the block runs to end of file
    pub end: Option<u64>,
}

impl BlockRange {
    pub fn new(start: u64, end: Option<u64>) -> Self {
        Self { start, end }
    }

    /// Length in bytes, if the end is known
    pub fn len(&self) -> Option<u64> {
        self.end.map(|end| end.saturating_sub(self.start))
    }

    pub fn is_eof_terminated(&self) -> bool {
        self.end.is_none()
    }
}

/// One article line of the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub title: String,
    pub record_id: u64,
    pub range: BlockRange,
}

/// On-disk form of the index
#[derive(Debug, Serialize, Deserialize)]
struct PersistedIndex {
    version: u32,
    source: Option<PathBuf>,
    built_at: DateTime<Utc>,
    entries: Vec<IndexEntry>,
}

/// Lookup table over every article in the dump
#[derive(Debug)]
pub struct ArchiveIndex {
    entries: Vec<IndexEntry>,
    /// Title to entry positions, in index-file order
    by_title: HashMap<String, Vec<usize>>,
    /// Page id to entry position
    by_id: HashMap<u64, usize>,
    source: Option<PathBuf>,
    built_at: DateTime<Utc>,
}

impl ArchiveIndex {
    const CURRENT_VERSION: u32 = 1;

    /// Build the index from the dump's index file.
    ///
    /// Files ending in `.bz2` are decompressed on the fly. `progress` is called
    /// with the number of lines read so far every 100k lines.
    pub fn from_index_file(path: impl AsRef<Path>, progress: impl FnMut(usize)) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let is_bz2 = path.extension().map(|e| e == "bz2").unwrap_or(false);

        info!("Building archive index from {}", path.display());

        let mut index = if is_bz2 {
            let decoder = MultiBzDecoder::new(file);
            Self::from_reader_with_progress(BufReader::with_capacity(1024 * 1024, decoder), progress)?
        } else {
            Self::from_reader_with_progress(BufReader::with_capacity(1024 * 1024, file), progress)?
        };
        index.source = Some(path.to_path_buf());

        info!(
            "Indexed {} articles across {} blocks",
            index.len(),
            index.blocks().len()
        );
        Ok(index)
    }

    /// Build the index from `offset:page_id:title` lines
    pub fn from_reader(reader: impl BufRead) -> Result<Self> {
        Self::from_reader_with_progress(reader, |_| {})
    }

    fn from_reader_with_progress(
        reader: impl BufRead,
        mut progress: impl FnMut(usize),
    ) -> Result<Self> {
        let mut rows = Vec::new();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            rows.push(parse_index_line(line, i + 1)?);

            if (i + 1) % 100_000 == 0 {
                progress(i + 1);
            }
        }

        // Each distinct offset ends where the next one begins
        let offsets: BTreeSet<u64> = rows.iter().map(|(offset, _, _)| *offset).collect();
        let mut block_end: HashMap<u64, Option<u64>> = HashMap::with_capacity(offsets.len());
        let mut iter = offsets.iter().peekable();
        while let Some(&start) = iter.next() {
            block_end.insert(start, iter.peek().map(|&&next| next));
        }

        let entries = rows
            .into_iter()
            .map(|(start, record_id, title)| IndexEntry {
                title,
                record_id,
                range: BlockRange::new(start, block_end[&start]),
            })
            .collect();

        Ok(Self::from_entries(entries, None, Utc::now()))
    }

    fn from_entries(
        entries: Vec<IndexEntry>,
        source: Option<PathBuf>,
        built_at: DateTime<Utc>,
    ) -> Self {
        let mut by_title: HashMap<String, Vec<usize>> = HashMap::with_capacity(entries.len());
        let mut by_id = HashMap::with_capacity(entries.len());

        for (pos, entry) in entries.iter().enumerate() {
            by_title.entry(entry.title.clone()).or_default().push(pos);
            by_id.entry(entry.record_id).or_insert(pos);
        }

        Self {
            entries,
            by_title,
            by_id,
            source,
            built_at,
        }
    }

    /// Find the entry for an exact title.
    ///
    /// When the dump index lists the same title more than once the first
    /// occurrence wins and the ambiguity is logged.
    pub fn lookup(&self, title: &str) -> Result<&IndexEntry> {
        let positions = self
            .by_title
            .get(title)
            .ok_or_else(|| ArchiveError::NotFound(title.to_string()))?;

        if positions.len() > 1 {
            warn!(
                "Got {} index entries for title '{}', using the first one",
                positions.len(),
                title
            );
        }

        let entry = &self.entries[positions[0]];
        debug!(
            "Index entry for '{}': id={} range={}..{:?}",
            title, entry.record_id, entry.range.start, entry.range.end
        );
        Ok(entry)
    }

    /// Find the entry for a page id
    pub fn lookup_id(&self, record_id: u64) -> Option<&IndexEntry> {
        self.by_id.get(&record_id).map(|&pos| &self.entries[pos])
    }

    pub fn contains(&self, title: &str) -> bool {
        self.by_title.contains_key(title)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Distinct block ranges, ordered by start offset
    pub fn blocks(&self) -> Vec<BlockRange> {
        let set: BTreeSet<BlockRange> = self.entries.iter().map(|e| e.range).collect();
        set.into_iter().collect()
    }

    /// Entries stored in the given block
    pub fn block_members(&self, range: &BlockRange) -> Vec<&IndexEntry> {
        self.entries.iter().filter(|e| e.range == *range).collect()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// Persist the index, writing through a temp file so a crash never
    /// leaves a truncated table behind
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let saved = PersistedIndex {
            version: Self::CURRENT_VERSION,
            source: self.source.clone(),
            built_at: self.built_at,
            entries: self.entries.clone(),
        };

        let temp_path = path.with_extension("tmp");
        {
            let mut writer = BufWriter::new(File::create(&temp_path)?);
            bincode::serialize_into(&mut writer, &saved)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&temp_path, path)?;

        info!(
            "Saved archive index with {} entries to {}",
            self.entries.len(),
            path.display()
        );
        Ok(())
    }

    /// Load an index written by [`ArchiveIndex::save`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let saved: PersistedIndex = bincode::deserialize_from(reader)?;

        if saved.version > Self::CURRENT_VERSION {
            warn!(
                "Archive index version {} is newer than supported {}",
                saved.version,
                Self::CURRENT_VERSION
            );
        }

        info!(
            "Loaded archive index with {} entries from {}",
            saved.entries.len(),
            path.display()
        );
        Ok(Self::from_entries(saved.entries, saved.source, saved.built_at))
    }
}

/// Split an index line on its first two colons; titles may contain more
fn parse_index_line(line: &str, line_no: usize) -> Result<(u64, u64, String)> {
    let mut parts = line.splitn(3, ':');
    let (Some(offset), Some(id), Some(title)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ArchiveError::IndexFormat {
            line: line_no,
            reason: "expected offset:page_id:title".to_string(),
        });
    };

    let offset = offset.trim().parse::<u64>().map_err(|e| ArchiveError::IndexFormat {
        line: line_no,
        reason: format!("bad byte offset '{}': {}", offset, e),
    })?;
    let id = id.trim().parse::<u64>().map_err(|e| ArchiveError::IndexFormat {
        line: line_no,
        reason: format!("bad page id '{}': {}", id, e),
    })?;

    Ok((offset, id, title.to_string()))
}
