use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::core::config::{AppPaths, Settings};
use crate::ingest::DocumentProcessor;
use crate::llm::{ModelProvider, OpenAiCompatProvider};
use crate::metrics::MetricsRegistry;
use crate::rag::{RagEngine, Retriever, SqliteVectorStore, VectorStore};
use crate::risk::RiskAnalyzer;

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Failed to load configuration: {0}")]
    Config(#[source] anyhow::Error),

    #[error("Failed to initialize vector store: {0}")]
    Store(#[source] anyhow::Error),
}

/// Global application state shared across all routes.
///
/// Contains references to:
/// - Configuration and paths
/// - The vector store and metrics registry
/// - The ingestion processor and query engine
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub settings: Settings,
    pub provider: Arc<dyn ModelProvider>,
    pub store: Arc<dyn VectorStore>,
    pub metrics: Arc<MetricsRegistry>,
    pub processor: DocumentProcessor,
    pub engine: RagEngine,
}

impl AppState {
    /// Initializes the application state.
    ///
    /// This process includes:
    /// 1. Resolving paths and loading configuration
    /// 2. Opening the chunk index database
    /// 3. Wiring the model provider into the processor and engine
    /// 4. Seeding dashboard counters from the live corpus
    pub async fn initialize() -> Result<Arc<Self>, InitializationError> {
        let paths = Arc::new(AppPaths::new());
        let settings =
            Settings::load(&paths).map_err(|e| InitializationError::Config(e.into()))?;

        let store = SqliteVectorStore::new(paths.as_ref())
            .await
            .map_err(|e| InitializationError::Store(e.into()))?;
        let provider: Arc<dyn ModelProvider> =
            Arc::new(OpenAiCompatProvider::new(&settings.provider));

        Self::assemble(paths, settings, provider, Arc::new(store)).await
    }

    /// Wires components around an existing provider and store.
    pub async fn assemble(
        paths: Arc<AppPaths>,
        settings: Settings,
        provider: Arc<dyn ModelProvider>,
        store: Arc<dyn VectorStore>,
    ) -> Result<Arc<Self>, InitializationError> {
        let metrics = Arc::new(MetricsRegistry::new(settings.dashboard.clone()));

        let documents = store
            .list_documents()
            .await
            .map_err(|e| InitializationError::Store(e.into()))?;
        let chunks: usize = documents.iter().map(|d| d.chunks).sum();
        metrics.seed(documents.len() as u64, chunks as u64);

        let processor = DocumentProcessor::new(
            provider.clone(),
            store.clone(),
            metrics.clone(),
            &settings,
        );
        let retriever = Retriever::new(
            provider.clone(),
            store.clone(),
            Duration::from_secs(settings.provider.request_timeout_secs),
        );
        let engine = RagEngine::new(
            retriever,
            provider.clone(),
            RiskAnalyzer::builtin(),
            metrics.clone(),
            &settings,
        );

        Ok(Arc::new(AppState {
            paths,
            settings,
            provider,
            store,
            metrics,
            processor,
            engine,
        }))
    }
}
