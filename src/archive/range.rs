//! Selective decompression of one bzip2 stream out of a multistream dump

use super::index::BlockRange;
use crate::error::{ArchiveError, Result};
use bzip2::read::BzDecoder;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Source of decompressed blocks
pub trait BlockReader: Send + Sync {
    /// Decompress the block at `range` into text
    fn read_block(&self, range: &BlockRange) -> Result<String>;
}

/// Reads blocks straight out of a `*-multistream.xml.bz2` file.
///
/// Every call opens its own file handle and a fresh decoder, so one reader
/// can be shared between workers without any cursor or decoder state leaking
/// across lookups.
#[derive(Debug, Clone)]
pub struct Bz2RangeReader {
    path: PathBuf,
}

impl Bz2RangeReader {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(ArchiveError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("archive not found: {}", path.display()),
            )));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decompress `start..end` (or `start..` to end of file when `end` is `None`)
    pub fn decompress(&self, start: u64, end: Option<u64>) -> Result<String> {
        let mut file = File::open(&self.path)?;
        let file_len = file.metadata()?.len();
        validate_range(start, end, file_len)?;

        file.seek(SeekFrom::Start(start))?;
        let compressed = match end {
            Some(end) => file.take(end - start),
            None => file.take(file_len - start),
        };

        let mut decoder = BzDecoder::new(BufReader::new(compressed));
        let mut raw = Vec::new();
        decoder
            .read_to_end(&mut raw)
            .map_err(|e| ArchiveError::Decompression(format!("block at byte {}: {}", start, e)))?;

        debug!(
            "Decompressed block {}..{:?} into {} bytes",
            start,
            end,
            raw.len()
        );

        String::from_utf8(raw).map_err(|e| {
            ArchiveError::Decompression(format!("block at byte {} is not UTF-8: {}", start, e))
        })
    }
}

impl BlockReader for Bz2RangeReader {
    fn read_block(&self, range: &BlockRange) -> Result<String> {
        self.decompress(range.start, range.end)
    }
}

fn validate_range(start: u64, end: Option<u64>, file_len: u64) -> Result<()> {
    let fail = |reason: String| {
        Err(ArchiveError::Range {
            start,
            end,
            reason,
        })
    };

    if start >= file_len {
        return fail(format!("start is past end of file ({} bytes)", file_len));
    }
    if let Some(end) = end {
        if start >= end {
            return fail("start must precede end".to_string());
        }
        if end > file_len {
            return fail(format!("end is past end of file ({} bytes)", file_len));
        }
    }
    Ok(())
}
