//! External model access.
//!
//! `ModelProvider` is the narrow seam the pipeline consumes: embeddings
//! in, vectors out; prompt in, answer out. `OpenAiCompatProvider` is the
//! production implementation.

mod openai;
mod provider;

pub use openai::OpenAiCompatProvider;
pub use provider::ModelProvider;

#[cfg(test)]
pub mod testing {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::ModelProvider;
    use crate::core::errors::ApiError;

    const DIM: usize = 16;

    /// Deterministic in-process provider for tests.
    ///
    /// Embeddings are bag-of-words hash buckets, so texts sharing words
    /// score higher cosine similarity and identical texts embed
    /// identically. Completion returns a canned answer, optionally
    /// failing or stalling to exercise error paths.
    pub struct StubProvider {
        pub answer: String,
        pub fail_completion: bool,
        pub completion_delay: Option<Duration>,
    }

    impl Default for StubProvider {
        fn default() -> Self {
            Self {
                answer: "stub answer".to_string(),
                fail_completion: false,
                completion_delay: None,
            }
        }
    }

    pub fn hash_embedding(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; DIM];
        for word in text.to_lowercase().split_whitespace() {
            let mut hasher = DefaultHasher::new();
            word.hash(&mut hasher);
            vector[(hasher.finish() % DIM as u64) as usize] += 1.0;
        }
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for value in &mut vector {
                *value /= norm;
            }
        }
        vector
    }

    #[async_trait]
    impl ModelProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        async fn health_check(&self) -> Result<bool, ApiError> {
            Ok(true)
        }

        async fn complete(&self, _prompt: &str) -> Result<String, ApiError> {
            if let Some(delay) = self.completion_delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_completion {
                return Err(ApiError::Generation("stub provider down".to_string()));
            }
            Ok(self.answer.clone())
        }

        async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
            Ok(inputs.iter().map(|text| hash_embedding(text)).collect())
        }
    }
}
