//! Error types shared by the archive, locator and store layers

use thiserror::Error;

/// Errors raised while locating and reading records from the archive
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Title is absent from the archive index
    #[error("article not found in index: {0}")]
    NotFound(String),

    /// Byte range is empty, inverted, or past the end of the archive
    #[error("invalid byte range {start}..{}: {reason}", display_end(.end))]
    Range {
        start: u64,
        end: Option<u64>,
        reason: String,
    },

    #[error("decompression error: {0}")]
    Decompression(String),

    /// Block was scanned to the end without a record carrying the requested id
    #[error("record {record_id} ({title}) not present in its indexed block")]
    RecordNotFound { title: String, record_id: u64 },

    #[error("malformed index line {line}: {reason}")]
    IndexFormat { line: usize, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("index persistence error: {0}")]
    Persist(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cache error: {0}")]
    Cache(String),

    #[error("graph store error: {0}")]
    Graph(String),
}

impl ArchiveError {
    /// Whether this error only means "this record is unavailable".
    ///
    /// The crawl skips such titles and carries on.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            ArchiveError::NotFound(_)
                | ArchiveError::Range { .. }
                | ArchiveError::Decompression(_)
                | ArchiveError::RecordNotFound { .. }
        )
    }
}

fn display_end(end: &Option<u64>) -> String {
    match end {
        Some(end) => end.to_string(),
        None => "EOF".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, ArchiveError>;
