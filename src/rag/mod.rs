//! Retrieval-augmented generation pipeline.
//!
//! This module provides:
//! - `VectorStore` / `SqliteVectorStore`: chunk persistence and
//!   nearest-neighbor search
//! - `Retriever`: query embedding + top-k lookup
//! - `RagEngine`: retrieve → generate → score orchestration

pub mod context;
pub mod engine;
pub mod retriever;
pub mod sqlite;
pub mod store;

pub use engine::{QueryResult, RagEngine, SourceRef};
pub use retriever::Retriever;
pub use sqlite::SqliteVectorStore;
pub use store::{ChunkRecord, DocumentSummary, ScoredChunk, VectorStore};
