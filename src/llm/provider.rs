use async_trait::async_trait;

use crate::core::errors::ApiError;

/// External model capability consumed by the pipeline.
///
/// Both the answer generator and the embedder live behind this trait so
/// the engine never sees transport details. Ingestion and query MUST go
/// through the same provider instance; mixing embedding models across
/// the two paths is a deployment error, not something handled here.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// provider name for logs (e.g. "openai-compat")
    fn name(&self) -> &str;

    /// check if the provider is reachable
    async fn health_check(&self) -> Result<bool, ApiError>;

    /// single-turn completion over an assembled prompt
    async fn complete(&self, prompt: &str) -> Result<String, ApiError>;

    /// embed a batch of texts, one vector per input, in order
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError>;
}
