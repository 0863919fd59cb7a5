//! Dashboard counters.
//!
//! One mutex-guarded accumulator shared by ingestion and query paths.
//! Every mutation goes through a method here so concurrent writers
//! never lose updates; reads take a snapshot copy and never block a
//! writer for longer than the copy.

use std::sync::Mutex;

use serde::Serialize;

use crate::core::config::settings::DashboardSettings;

/// Process-wide accumulator state.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsState {
    pub total_documents: u64,
    pub total_chunks: u64,
    pub total_queries: u64,
    pub confidence_sum: f64,
}

/// Dashboard-ready summary derived from a snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub compliance_score: f64,
    pub total_documents: u64,
    pub total_chunks: u64,
    pub total_queries: u64,
    pub avg_confidence: f64,
}

pub struct MetricsRegistry {
    state: Mutex<MetricsState>,
    settings: DashboardSettings,
}

impl MetricsRegistry {
    pub fn new(settings: DashboardSettings) -> Self {
        Self {
            state: Mutex::new(MetricsState::default()),
            settings,
        }
    }

    /// Seed document/chunk counts from the store's live rows, so the
    /// chunk-count invariant holds across restarts.
    pub fn seed(&self, documents: u64, chunks: u64) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.total_documents = documents;
        state.total_chunks = chunks;
    }

    /// A new document finished ingesting with `chunks` chunks.
    pub fn record_document(&self, chunks: u64) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.total_documents += 1;
        state.total_chunks += chunks;
    }

    /// An existing document was re-ingested: its chunk count changed
    /// from `old_chunks` to `new_chunks`; the document count does not.
    pub fn record_replacement(&self, old_chunks: u64, new_chunks: u64) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.total_chunks = state.total_chunks - old_chunks + new_chunks;
    }

    /// A query completed with the given answer confidence.
    pub fn record_query(&self, confidence: f64) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.total_queries += 1;
        state.confidence_sum += confidence;
    }

    /// Zero everything; paired with clearing the vector store.
    pub fn reset(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        *state = MetricsState::default();
    }

    pub fn snapshot(&self) -> MetricsState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn dashboard(&self) -> DashboardReport {
        let state = self.snapshot();

        let avg_confidence = if state.total_queries > 0 {
            state.confidence_sum / state.total_queries as f64
        } else {
            0.0
        };

        let target = self.settings.coverage_target_chunks.max(1);
        let coverage = (state.total_chunks.min(target) as f64 / target as f64) * 100.0;
        let compliance_score = (self.settings.coverage_weight * coverage
            + self.settings.confidence_weight * avg_confidence * 100.0)
            .clamp(0.0, 100.0);

        DashboardReport {
            compliance_score,
            total_documents: state.total_documents,
            total_chunks: state.total_chunks,
            total_queries: state.total_queries,
            avg_confidence,
        }
    }
}
