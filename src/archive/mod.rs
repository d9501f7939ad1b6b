//! Random access into Wikipedia multistream dumps
//!
//! ```text
//!  title ──► ArchiveIndex ──► BlockRange ──► BlockReader ──► block text
//!                                                               │
//!                        IsolatedRecord ◄── RecordIsolator ◄────┘
//! ```
//!
//! A `*-pages-articles-multistream.xml.bz2` dump is a concatenation of
//! independent bzip2 streams holding about a hundred `<page>` elements each.
//! The companion index gives the stream offset for every title, which is all
//! that is needed to decompress a single stream instead of the whole dump.

pub mod index;
pub mod isolate;
pub mod range;

pub use index::{ArchiveIndex, BlockRange, IndexEntry};
pub use isolate::{isolate_record, IsolatedRecord, RecordIsolator};
pub use range::{BlockReader, Bz2RangeReader};
