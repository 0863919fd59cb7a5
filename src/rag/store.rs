//! VectorStore trait — abstract interface for chunk persistence and
//! nearest-neighbor search.
//!
//! The primary implementation is `SqliteVectorStore` in the `sqlite`
//! module. Chunk records are created in bulk during ingestion and never
//! mutated afterwards; replacing a document swaps its whole batch.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;

/// A persisted chunk of an ingested document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Unique chunk identifier, stable per (document, position).
    pub chunk_id: String,
    /// Filename of the owning document.
    pub document: String,
    /// The text content of the chunk.
    pub content: String,
    /// Zero-based position within the document.
    pub position: usize,
}

/// Result of a similarity search. Similarity is cosine clamped to [0,1].
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub record: ChunkRecord,
    pub similarity: f32,
}

/// A document as reported by `/documents`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub filename: String,
    pub chunks: usize,
}

/// Abstract vector store.
///
/// Implementations must commit a document's chunks atomically so a
/// concurrent reader never observes a partially-ingested document, and
/// must tolerate concurrent readers and writers.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Replace all chunks of `document` with `items` in one atomic batch.
    /// For a new document this is a plain batch insert.
    async fn replace_document(
        &self,
        document: &str,
        items: Vec<(ChunkRecord, Vec<f32>)>,
    ) -> Result<(), ApiError>;

    /// Top-`limit` chunks by similarity to the query embedding,
    /// descending; ties broken by insertion order (earliest first).
    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredChunk>, ApiError>;

    /// Total chunk count across all documents.
    async fn count(&self) -> Result<usize, ApiError>;

    /// Chunk count for one document (0 when absent).
    async fn document_chunk_count(&self, document: &str) -> Result<usize, ApiError>;

    /// All documents with their chunk counts, in ingestion order.
    async fn list_documents(&self) -> Result<Vec<DocumentSummary>, ApiError>;

    /// Remove every chunk. Returns the number removed.
    async fn clear(&self) -> Result<usize, ApiError>;
}
