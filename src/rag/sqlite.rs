//! SQLite-backed vector store.
//!
//! In-process store using SQLite for chunk rows and brute-force cosine
//! similarity over deserialized embedding BLOBs. Fine for corpora in
//! the tens of thousands of chunks; larger deployments would swap in a
//! dedicated index behind the same trait.

use std::path::PathBuf;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};

use super::store::{ChunkRecord, DocumentSummary, ScoredChunk, VectorStore};
use crate::core::config::AppPaths;
use crate::core::errors::ApiError;

pub struct SqliteVectorStore {
    pool: SqlitePool,
    #[allow(dead_code)]
    db_path: PathBuf,
}

impl SqliteVectorStore {
    pub async fn new(paths: &AppPaths) -> Result<Self, ApiError> {
        Self::with_path(paths.index_db_path.clone()).await
    }

    pub async fn with_path(db_path: PathBuf) -> Result<Self, ApiError> {
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(ApiError::internal)?;

        let store = Self { pool, db_path };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), ApiError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS chunks (
                chunk_id TEXT PRIMARY KEY,
                document TEXT NOT NULL,
                content TEXT NOT NULL,
                position INTEGER NOT NULL,
                embedding BLOB NOT NULL,
                created_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_chunks_document ON chunks(document)")
            .execute(&self.pool)
            .await
            .map_err(ApiError::internal)?;

        Ok(())
    }

    fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn deserialize_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> ChunkRecord {
        let position: i64 = row.get("position");
        ChunkRecord {
            chunk_id: row.get("chunk_id"),
            document: row.get("document"),
            content: row.get("content"),
            position: position as usize,
        }
    }
}

/// Cosine similarity clamped to [0,1]; vectors pointing away from the
/// query score 0 rather than negative.
pub fn similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denom = norm_a * norm_b;

    if denom <= f32::EPSILON {
        0.0
    } else {
        (dot / denom).clamp(0.0, 1.0)
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    async fn replace_document(
        &self,
        document: &str,
        items: Vec<(ChunkRecord, Vec<f32>)>,
    ) -> Result<(), ApiError> {
        let mut tx = self.pool.begin().await.map_err(ApiError::internal)?;

        sqlx::query("DELETE FROM chunks WHERE document = ?1")
            .bind(document)
            .execute(&mut *tx)
            .await
            .map_err(ApiError::internal)?;

        for (record, embedding) in &items {
            let blob = Self::serialize_embedding(embedding);
            sqlx::query(
                "INSERT INTO chunks (chunk_id, document, content, position, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(&record.chunk_id)
            .bind(&record.document)
            .bind(&record.content)
            .bind(record.position as i64)
            .bind(&blob)
            .execute(&mut *tx)
            .await
            .map_err(ApiError::internal)?;
        }

        tx.commit().await.map_err(ApiError::internal)
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredChunk>, ApiError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            "SELECT rowid, chunk_id, document, content, position, embedding FROM chunks",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        let mut scored: Vec<(i64, ScoredChunk)> = rows
            .iter()
            .map(|row| {
                let rowid: i64 = row.get("rowid");
                let embedding_bytes: Vec<u8> = row.get("embedding");
                let stored = Self::deserialize_embedding(&embedding_bytes);
                let chunk = ScoredChunk {
                    record: Self::row_to_record(row),
                    similarity: similarity(query_embedding, &stored),
                };
                (rowid, chunk)
            })
            .collect();

        // Similarity descending, insertion order breaking ties.
        scored.sort_by(|(rowid_a, a), (rowid_b, b)| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(rowid_a.cmp(rowid_b))
        });
        scored.truncate(limit);

        Ok(scored.into_iter().map(|(_, chunk)| chunk).collect())
    }

    async fn count(&self) -> Result<usize, ApiError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks")
            .fetch_one(&self.pool)
            .await
            .map_err(ApiError::internal)?;
        Ok(count as usize)
    }

    async fn document_chunk_count(&self, document: &str) -> Result<usize, ApiError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks WHERE document = ?1")
            .bind(document)
            .fetch_one(&self.pool)
            .await
            .map_err(ApiError::internal)?;
        Ok(count as usize)
    }

    async fn list_documents(&self) -> Result<Vec<DocumentSummary>, ApiError> {
        let rows = sqlx::query(
            "SELECT document, COUNT(*) AS chunk_count
             FROM chunks
             GROUP BY document
             ORDER BY MIN(rowid)",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        Ok(rows
            .iter()
            .map(|row| {
                let chunks: i64 = row.get("chunk_count");
                DocumentSummary {
                    filename: row.get("document"),
                    chunks: chunks as usize,
                }
            })
            .collect())
    }

    async fn clear(&self) -> Result<usize, ApiError> {
        let result = sqlx::query("DELETE FROM chunks")
            .execute(&self.pool)
            .await
            .map_err(ApiError::internal)?;
        Ok(result.rows_affected() as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> SqliteVectorStore {
        let tmp = std::env::temp_dir().join(format!(
            "regsense-index-test-{}.db",
            uuid::Uuid::new_v4()
        ));
        SqliteVectorStore::with_path(tmp).await.unwrap()
    }

    fn make_item(document: &str, position: usize, content: &str, embedding: Vec<f32>) -> (ChunkRecord, Vec<f32>) {
        (
            ChunkRecord {
                chunk_id: format!("{}_{}", document, position),
                document: document.to_string(),
                content: content.to_string(),
                position,
            },
            embedding,
        )
    }

    #[tokio::test]
    async fn insert_and_search() {
        let store = test_store().await;

        store
            .replace_document(
                "a.txt",
                vec![
                    make_item("a.txt", 0, "matching text", vec![1.0, 0.0, 0.0]),
                    make_item("a.txt", 1, "orthogonal text", vec![0.0, 1.0, 0.0]),
                ],
            )
            .await
            .unwrap();

        let results = store.search(&[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].record.content, "matching text");
        assert!(results[0].similarity > 0.99);
        assert!(results[1].similarity < 0.01);
    }

    #[tokio::test]
    async fn search_never_exceeds_limit_and_empty_corpus_is_empty() {
        let store = test_store().await;
        assert!(store.search(&[1.0, 0.0], 5).await.unwrap().is_empty());

        store
            .replace_document(
                "a.txt",
                (0..4)
                    .map(|i| make_item("a.txt", i, "text", vec![1.0, 0.0]))
                    .collect(),
            )
            .await
            .unwrap();

        assert_eq!(store.search(&[1.0, 0.0], 2).await.unwrap().len(), 2);
        assert_eq!(store.search(&[1.0, 0.0], 10).await.unwrap().len(), 4);
        assert!(store.search(&[1.0, 0.0], 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ties_break_by_insertion_order() {
        let store = test_store().await;

        store
            .replace_document(
                "first.txt",
                vec![make_item("first.txt", 0, "first", vec![1.0, 0.0])],
            )
            .await
            .unwrap();
        store
            .replace_document(
                "second.txt",
                vec![make_item("second.txt", 0, "second", vec![1.0, 0.0])],
            )
            .await
            .unwrap();

        let results = store.search(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(results[0].record.document, "first.txt");
        assert_eq!(results[1].record.document, "second.txt");
    }

    #[tokio::test]
    async fn replace_document_swaps_the_batch() {
        let store = test_store().await;

        store
            .replace_document(
                "a.txt",
                (0..3)
                    .map(|i| make_item("a.txt", i, "old", vec![1.0]))
                    .collect(),
            )
            .await
            .unwrap();
        assert_eq!(store.document_chunk_count("a.txt").await.unwrap(), 3);

        store
            .replace_document("a.txt", vec![make_item("a.txt", 0, "new", vec![1.0])])
            .await
            .unwrap();
        assert_eq!(store.document_chunk_count("a.txt").await.unwrap(), 1);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn list_documents_groups_by_filename() {
        let store = test_store().await;

        store
            .replace_document(
                "a.txt",
                (0..3)
                    .map(|i| make_item("a.txt", i, "a", vec![1.0]))
                    .collect(),
            )
            .await
            .unwrap();
        store
            .replace_document("b.txt", vec![make_item("b.txt", 0, "b", vec![1.0])])
            .await
            .unwrap();

        let documents = store.list_documents().await.unwrap();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].filename, "a.txt");
        assert_eq!(documents[0].chunks, 3);
        assert_eq!(documents[1].filename, "b.txt");
        assert_eq!(documents[1].chunks, 1);

        let total: usize = documents.iter().map(|d| d.chunks).sum();
        assert_eq!(total, store.count().await.unwrap());
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let store = test_store().await;

        store
            .replace_document(
                "a.txt",
                (0..5)
                    .map(|i| make_item("a.txt", i, "a", vec![1.0]))
                    .collect(),
            )
            .await
            .unwrap();

        assert_eq!(store.clear().await.unwrap(), 5);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[test]
    fn similarity_is_bounded() {
        assert!((similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert_eq!(similarity(&[1.0, 0.0], &[-1.0, 0.0]), 0.0);
        assert_eq!(similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(similarity(&[], &[]), 0.0);
        assert_eq!(similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }
}
