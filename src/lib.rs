//! wikigraph: random access into Wikipedia multistream dumps
//!
//! Builds a graph of musical artists by following article links, reading
//! each article straight out of the compressed dump:
//! - index of `offset:id:title` lines to locate an article's bzip2 block
//! - single-block decompression and `<page>` isolation
//! - heuristic classification, link extraction and infobox normalisation
//! - breadth-first crawl into a pluggable graph store

pub mod analysis;
pub mod archive;
pub mod config;
pub mod crawl;
pub mod error;
pub mod locator;
pub mod store;

pub use config::Config;
pub use error::{ArchiveError, Result};
pub use locator::RecordLocator;
