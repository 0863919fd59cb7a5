//! Query orchestration: retrieve → generate → score.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::time::timeout;

use super::context;
use super::retriever::Retriever;
use super::store::ScoredChunk;
use crate::core::config::Settings;
use crate::core::errors::ApiError;
use crate::llm::ModelProvider;
use crate::metrics::MetricsRegistry;
use crate::risk::{RiskAnalyzer, RiskLevel};

/// Phase a query call is in; logged and attached to failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryPhase {
    Retrieving,
    Generating,
    Scoring,
}

impl QueryPhase {
    fn as_str(self) -> &'static str {
        match self {
            QueryPhase::Retrieving => "retrieving",
            QueryPhase::Generating => "generating",
            QueryPhase::Scoring => "scoring",
        }
    }
}

/// One cited source backing an answer.
#[derive(Debug, Clone, Serialize)]
pub struct SourceRef {
    pub filename: String,
    pub snippet: String,
    pub similarity: f32,
}

/// Full result of one query call.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub answer: String,
    pub sources: Vec<SourceRef>,
    pub confidence: f32,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub risk_flags: Vec<String>,
    pub query_time: f64,
}

pub struct RagEngine {
    retriever: Retriever,
    provider: Arc<dyn ModelProvider>,
    analyzer: RiskAnalyzer,
    metrics: Arc<MetricsRegistry>,
    max_context_chars: usize,
    snippet_chars: usize,
    call_timeout: Duration,
}

impl RagEngine {
    pub fn new(
        retriever: Retriever,
        provider: Arc<dyn ModelProvider>,
        analyzer: RiskAnalyzer,
        metrics: Arc<MetricsRegistry>,
        settings: &Settings,
    ) -> Self {
        Self {
            retriever,
            provider,
            analyzer,
            metrics,
            max_context_chars: settings.query.max_context_chars,
            snippet_chars: settings.query.snippet_chars,
            call_timeout: Duration::from_secs(settings.provider.request_timeout_secs),
        }
    }

    /// Answer `text` using the top `n_results` chunks.
    ///
    /// An empty corpus is not an error: generation still runs against an
    /// explicit no-context marker and the result carries zero confidence
    /// and no sources. Failures before completion update no counters.
    pub async fn query(&self, text: &str, n_results: usize) -> Result<QueryResult, ApiError> {
        let started = Instant::now();

        let query = text.trim();
        if query.is_empty() {
            return Err(ApiError::InvalidQuery(
                "Query must not be empty".to_string(),
            ));
        }

        self.enter_phase(QueryPhase::Retrieving);
        let retrieved = self
            .retriever
            .retrieve(query, n_results)
            .await
            .inspect_err(|e| self.log_failure(QueryPhase::Retrieving, e))?;

        self.enter_phase(QueryPhase::Generating);
        let assembled = context::assemble(&retrieved, self.max_context_chars);
        let prompt = context::build_prompt(query, &assembled);
        let answer = timeout(self.call_timeout, self.provider.complete(&prompt))
            .await
            .map_err(|_| {
                ApiError::Timeout(format!(
                    "answer generation exceeded {}s",
                    self.call_timeout.as_secs()
                ))
            })
            .and_then(|inner| inner)
            .inspect_err(|e| self.log_failure(QueryPhase::Generating, e))?;

        self.enter_phase(QueryPhase::Scoring);
        let confidence = retrieved
            .first()
            .map(|chunk| chunk.similarity.clamp(0.0, 1.0))
            .unwrap_or(0.0);
        let assessment = self.analyzer.analyze(query, &retrieved);
        let sources = self.build_sources(&retrieved);

        self.metrics.record_query(confidence as f64);

        let query_time = started.elapsed().as_secs_f64();
        tracing::info!(
            query_len = query.len(),
            retrieved = retrieved.len(),
            confidence,
            risk_score = assessment.risk_score,
            query_time,
            "query complete"
        );

        Ok(QueryResult {
            answer,
            sources,
            confidence,
            risk_score: assessment.risk_score,
            risk_level: assessment.risk_level,
            risk_flags: assessment.risk_flags,
            query_time,
        })
    }

    /// Sources in similarity order, one entry per document (the best
    /// chunk wins), snippets bounded.
    fn build_sources(&self, retrieved: &[ScoredChunk]) -> Vec<SourceRef> {
        let mut sources: Vec<SourceRef> = Vec::new();
        for chunk in retrieved {
            if sources.iter().any(|s| s.filename == chunk.record.document) {
                continue;
            }
            let snippet: String = chunk
                .record
                .content
                .chars()
                .take(self.snippet_chars)
                .collect();
            sources.push(SourceRef {
                filename: chunk.record.document.clone(),
                snippet,
                similarity: chunk.similarity,
            });
        }
        sources
    }

    fn enter_phase(&self, phase: QueryPhase) {
        tracing::debug!(phase = phase.as_str(), "query phase");
    }

    fn log_failure(&self, phase: QueryPhase, error: &ApiError) {
        tracing::warn!(phase = phase.as_str(), %error, "query failed");
    }
}
