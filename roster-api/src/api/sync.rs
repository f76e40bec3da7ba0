//! Manual sync trigger

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::{ApiResult, AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub message: String,
    pub records_processed: usize,
    pub timestamp: DateTime<Utc>,
}

/// POST /api/sync/google-sheets
///
/// Runs a full sync before responding. On failure the cache keeps serving
/// the previous generation.
pub async fn trigger_sync(State(state): State<AppState>) -> ApiResult<Json<SyncResponse>> {
    info!("Manual sync requested");
    let outcome = state.orchestrator.sync().await?;

    Ok(Json(SyncResponse {
        message: "Google Sheets sync completed successfully".to_string(),
        records_processed: outcome.records_processed,
        timestamp: outcome.synced_at,
    }))
}
