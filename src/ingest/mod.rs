//! Document ingestion: format-specific extraction, chunking, and the
//! processor that drives embedding and storage.

pub mod chunker;
pub mod extract;
mod processor;

pub use processor::{DocumentProcessor, IngestReport};
