use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

/// Accepts one multipart file field and runs it through ingestion.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Could not read upload: {}", e)))?;

        let report = state.processor.ingest(&filename, &bytes).await?;
        return Ok(Json(json!({
            "filename": report.filename,
            "chunks": report.chunk_count
        })));
    }

    Err(ApiError::BadRequest(
        "Upload must include a file field".to_string(),
    ))
}

pub async fn list_documents(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let documents = state.store.list_documents().await?;
    Ok(Json(json!({ "documents": documents })))
}

/// Clear-all: empties the store and resets the dashboard counters.
pub async fn clear_documents(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let removed = state.store.clear().await?;
    state.metrics.reset();
    tracing::info!(removed, "index cleared");
    Ok(Json(json!({ "removed_chunks": removed })))
}
