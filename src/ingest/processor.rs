//! Document ingestion pipeline: extract → chunk → embed → commit.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tokio::time::timeout;

use super::{chunker, extract};
use crate::core::config::Settings;
use crate::core::errors::ApiError;
use crate::llm::ModelProvider;
use crate::metrics::MetricsRegistry;
use crate::rag::store::{ChunkRecord, VectorStore};

/// Ingestion metadata returned to the uploader.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub filename: String,
    pub chunk_count: usize,
}

pub struct DocumentProcessor {
    provider: Arc<dyn ModelProvider>,
    store: Arc<dyn VectorStore>,
    metrics: Arc<MetricsRegistry>,
    chunk_size: usize,
    chunk_overlap: usize,
    call_timeout: Duration,
}

impl DocumentProcessor {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        store: Arc<dyn VectorStore>,
        metrics: Arc<MetricsRegistry>,
        settings: &Settings,
    ) -> Self {
        Self {
            provider,
            store,
            metrics,
            chunk_size: settings.ingest.chunk_size,
            chunk_overlap: settings.ingest.chunk_overlap,
            call_timeout: Duration::from_secs(settings.provider.request_timeout_secs),
        }
    }

    /// Ingest one uploaded file.
    ///
    /// All-or-nothing: chunks reach the store only through a single
    /// atomic batch after extraction, chunking, and embedding have all
    /// succeeded. Counters update only after the batch commits.
    pub async fn ingest(&self, filename: &str, bytes: &[u8]) -> Result<IngestReport, ApiError> {
        let text = extract::extract_text(filename, bytes)?;
        let chunks = chunker::chunk(&text, self.chunk_size, self.chunk_overlap);
        if chunks.is_empty() {
            return Err(ApiError::EmptyDocument(format!(
                "No usable text could be extracted from {}",
                filename
            )));
        }

        let embeddings = timeout(self.call_timeout, self.provider.embed(&chunks))
            .await
            .map_err(|_| {
                ApiError::Timeout(format!(
                    "embedding {} exceeded {}s",
                    filename,
                    self.call_timeout.as_secs()
                ))
            })??;

        if embeddings.len() != chunks.len() {
            return Err(ApiError::Internal(format!(
                "embedding count mismatch for {}: {} chunks, {} vectors",
                filename,
                chunks.len(),
                embeddings.len()
            )));
        }

        let prefix = document_prefix(filename);
        let items: Vec<(ChunkRecord, Vec<f32>)> = chunks
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(position, (content, embedding))| {
                (
                    ChunkRecord {
                        chunk_id: format!("{}_{}", prefix, position),
                        document: filename.to_string(),
                        content,
                        position,
                    },
                    embedding,
                )
            })
            .collect();
        let chunk_count = items.len();

        let existing = self.store.document_chunk_count(filename).await?;
        self.store.replace_document(filename, items).await?;

        if existing == 0 {
            self.metrics.record_document(chunk_count as u64);
        } else {
            self.metrics
                .record_replacement(existing as u64, chunk_count as u64);
        }

        tracing::info!(
            filename,
            chunk_count,
            replaced = existing > 0,
            "document ingested"
        );

        Ok(IngestReport {
            filename: filename.to_string(),
            chunk_count,
        })
    }
}

/// Stable chunk-id prefix for a document.
fn document_prefix(filename: &str) -> String {
    let digest = Sha256::digest(filename.as_bytes());
    hex::encode(&digest[..4])
}
