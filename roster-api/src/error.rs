//! Error types for roster-api
//!
//! Every error leaves as JSON: `{ "error": <summary> }`, plus `"details"`
//! when there is an underlying cause worth showing.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use roster_common::SyncError;
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Invalid request parameter (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Manual sync failed (409 while another sync runs, 500 otherwise)
    #[error("Sync failed: {0}")]
    Sync(#[from] SyncError),

    /// Diagnostic request to the sheet failed (502)
    #[error("Upstream request failed: {0}")]
    Upstream(SyncError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid request", "details": msg }),
            ),
            ApiError::Sync(SyncError::SyncInProgress) => (
                StatusCode::CONFLICT,
                json!({
                    "error": "Sync already in progress",
                    "details": SyncError::SyncInProgress.to_string(),
                }),
            ),
            ApiError::Sync(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "Failed to sync Google Sheets data",
                    "details": err.to_string(),
                }),
            ),
            ApiError::Upstream(err) => (
                StatusCode::BAD_GATEWAY,
                json!({
                    "error": "Upstream request failed",
                    "details": err.to_string(),
                }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
