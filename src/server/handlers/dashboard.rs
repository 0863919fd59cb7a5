use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::state::AppState;

pub async fn dashboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.metrics.dashboard())
}
