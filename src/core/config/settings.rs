use std::env;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths::AppPaths;
use crate::core::errors::ApiError;

/// Typed application configuration, loaded from `config.yml`.
///
/// Every field has a serde default so a missing or partial file still
/// produces a runnable configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    pub ingest: IngestSettings,
    pub query: QuerySettings,
    pub dashboard: DashboardSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Base URL of an OpenAI-compatible API serving both models.
    pub base_url: String,
    pub chat_model: String,
    pub embedding_model: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    /// Chunk window in characters.
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks.
    pub chunk_overlap: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    pub default_top_k: usize,
    pub max_top_k: usize,
    pub max_context_chars: usize,
    pub snippet_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    /// Weight of corpus coverage in the compliance score.
    pub coverage_weight: f64,
    /// Weight of average answer confidence in the compliance score.
    pub confidence_weight: f64,
    /// Chunk count treated as full coverage.
    pub coverage_target_chunks: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            provider: ProviderSettings::default(),
            ingest: IngestSettings::default(),
            query: QuerySettings::default(),
            dashboard: DashboardSettings::default(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
            ],
        }
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            chat_model: "compliance-chat".to_string(),
            embedding_model: "compliance-embed".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            default_top_k: 5,
            max_top_k: 20,
            max_context_chars: 4000,
            snippet_chars: 300,
        }
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            coverage_weight: 0.6,
            confidence_weight: 0.4,
            coverage_target_chunks: 100,
        }
    }
}

impl Settings {
    /// Loads settings from `REGSENSE_CONFIG_PATH`, the user data dir, or
    /// the project root, falling back to defaults when no file exists.
    pub fn load(paths: &AppPaths) -> Result<Self, ApiError> {
        let path = config_path(paths);
        let settings = match fs::read_to_string(&path) {
            Ok(raw) => serde_yaml::from_str::<Settings>(&raw).map_err(|e| {
                ApiError::Internal(format!("invalid config {}: {}", path.display(), e))
            })?,
            Err(_) => Settings::default(),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.ingest.chunk_size == 0 {
            return Err(ApiError::Internal(
                "ingest.chunk_size must be positive".to_string(),
            ));
        }
        if self.ingest.chunk_overlap >= self.ingest.chunk_size {
            return Err(ApiError::Internal(format!(
                "ingest.chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.ingest.chunk_overlap, self.ingest.chunk_size
            )));
        }
        if self.query.default_top_k == 0 || self.query.default_top_k > self.query.max_top_k {
            return Err(ApiError::Internal(format!(
                "query.default_top_k ({}) must be in 1..={}",
                self.query.default_top_k, self.query.max_top_k
            )));
        }
        if self.provider.request_timeout_secs == 0 {
            return Err(ApiError::Internal(
                "provider.request_timeout_secs must be positive".to_string(),
            ));
        }
        let weight_sum = self.dashboard.coverage_weight + self.dashboard.confidence_weight;
        if !(0.0..=1.0).contains(&self.dashboard.coverage_weight)
            || !(0.0..=1.0).contains(&self.dashboard.confidence_weight)
            || (weight_sum - 1.0).abs() > 1e-6
        {
            return Err(ApiError::Internal(format!(
                "dashboard weights must be in [0,1] and sum to 1.0 (got {})",
                weight_sum
            )));
        }
        Ok(())
    }
}

fn config_path(paths: &AppPaths) -> PathBuf {
    if let Ok(path) = env::var("REGSENSE_CONFIG_PATH") {
        return PathBuf::from(path);
    }

    let user_config = paths.user_data_dir.join("config.yml");
    if user_config.exists() {
        return user_config;
    }

    paths.project_root.join("config.yml")
}
