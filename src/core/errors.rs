use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

/// Error taxonomy for the ingestion and query pipelines.
///
/// Every variant maps to an HTTP status and a `detail` message the UI
/// renders verbatim.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("extraction failed: {0}")]
    Extraction(String),
    #[error("empty document: {0}")]
    EmptyDocument(String),
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error("generation failed: {0}")]
    Generation(String),
    #[error("timed out: {0}")]
    Timeout(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            ApiError::UnsupportedFormat(msg) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, msg.clone())
            }
            ApiError::Extraction(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            ApiError::EmptyDocument(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            ApiError::InvalidQuery(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Generation(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            ApiError::Timeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({ "detail": message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_format_maps_to_415() {
        let response = ApiError::UnsupportedFormat(".exe is not supported".to_string())
            .into_response();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[test]
    fn invalid_query_maps_to_400() {
        let response = ApiError::InvalidQuery("query must not be empty".to_string())
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn timeout_maps_to_504() {
        let response = ApiError::Timeout("embedding call exceeded 30s".to_string())
            .into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }
}
