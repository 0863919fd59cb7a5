use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::core::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    pub n_results: Option<usize>,
}

pub async fn query(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QueryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let n_results = payload
        .n_results
        .unwrap_or(state.settings.query.default_top_k)
        .min(state.settings.query.max_top_k);

    let result = state.engine.query(&payload.query, n_results).await?;
    Ok(Json(result))
}
