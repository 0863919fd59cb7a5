//! Query-side retrieval over the vector store.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use super::store::{ScoredChunk, VectorStore};
use crate::core::errors::ApiError;
use crate::llm::ModelProvider;

/// Embeds queries and returns the nearest chunks.
///
/// Must share its provider with ingestion; querying one embedding space
/// with vectors from another is a deployment error this layer does not
/// try to detect.
pub struct Retriever {
    provider: Arc<dyn ModelProvider>,
    store: Arc<dyn VectorStore>,
    call_timeout: Duration,
}

impl Retriever {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        store: Arc<dyn VectorStore>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            store,
            call_timeout,
        }
    }

    /// Top-`k` chunks by similarity, descending. An empty corpus yields
    /// an empty result, not an error.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>, ApiError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let embeddings = timeout(
            self.call_timeout,
            self.provider.embed(&[query.to_string()]),
        )
        .await
        .map_err(|_| {
            ApiError::Timeout(format!(
                "query embedding exceeded {}s",
                self.call_timeout.as_secs()
            ))
        })??;

        let query_embedding = embeddings
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::Internal("provider returned no query embedding".to_string()))?;

        self.store.search(&query_embedding, k).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::StubProvider;
    use crate::rag::sqlite::SqliteVectorStore;
    use crate::rag::store::ChunkRecord;

    async fn retriever_with_store() -> (Retriever, Arc<SqliteVectorStore>) {
        let tmp = std::env::temp_dir().join(format!(
            "regsense-retriever-test-{}.db",
            uuid::Uuid::new_v4()
        ));
        let store = Arc::new(SqliteVectorStore::with_path(tmp).await.unwrap());
        let retriever = Retriever::new(
            Arc::new(StubProvider::default()),
            store.clone(),
            Duration::from_secs(5),
        );
        (retriever, store)
    }

    async fn seed(store: &SqliteVectorStore, document: &str, texts: &[&str]) {
        let provider = StubProvider::default();
        let inputs: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
        let embeddings = provider.embed(&inputs).await.unwrap();
        let items = inputs
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(position, (content, embedding))| {
                (
                    ChunkRecord {
                        chunk_id: format!("{}_{}", document, position),
                        document: document.to_string(),
                        content,
                        position,
                    },
                    embedding,
                )
            })
            .collect();
        store.replace_document(document, items).await.unwrap();
    }

    #[tokio::test]
    async fn empty_corpus_returns_empty() {
        let (retriever, _store) = retriever_with_store().await;
        let results = retriever.retrieve("any question", 5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn returns_at_most_k_ranked_by_similarity() {
        let (retriever, store) = retriever_with_store().await;
        seed(
            &store,
            "reg.txt",
            &[
                "customer due diligence requirements",
                "penalties for late filing",
                "weather conditions tomorrow",
            ],
        )
        .await;

        let results = retriever
            .retrieve("customer due diligence requirements", 2)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(
            results[0].record.content,
            "customer due diligence requirements"
        );
        assert!(results[0].similarity >= results[1].similarity);
        assert!(results[0].similarity > 0.99);
    }

    #[tokio::test]
    async fn zero_k_short_circuits() {
        let (retriever, store) = retriever_with_store().await;
        seed(&store, "reg.txt", &["some text"]).await;
        assert!(retriever.retrieve("some text", 0).await.unwrap().is_empty());
    }
}
