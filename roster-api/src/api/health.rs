//! Health check endpoint
//!
//! Liveness plus a snapshot of the cache, so a dashboard can tell real
//! sheet data from the sample fallback.

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use roster_common::{DataOrigin, EnrollmentRecord};
use serde::Serialize;

use crate::AppState;

/// Records echoed in `dataStatus.sampleData`
const HEALTH_SAMPLE_SIZE: usize = 2;

/// Health check response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    /// Seconds since service started
    pub uptime_seconds: u64,
    pub data_status: DataStatus,
}

/// Cache state as seen by the health endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataStatus {
    pub total_records: usize,
    pub last_sync: Option<DateTime<Utc>>,
    pub is_loading: bool,
    pub origin: DataOrigin,
    /// First records of the cache, for eyeballing the shape
    pub sample_data: Vec<EnrollmentRecord>,
}

/// GET /api/health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.store.snapshot().await;
    let now = Utc::now();
    let uptime_seconds = now
        .signed_duration_since(state.startup_time)
        .num_seconds()
        .max(0) as u64;

    Json(HealthResponse {
        status: "ok".to_string(),
        module: "roster-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: now,
        uptime_seconds,
        data_status: DataStatus {
            total_records: snapshot.records.len(),
            last_sync: snapshot.last_sync,
            is_loading: snapshot.is_loading,
            origin: snapshot.origin,
            sample_data: snapshot
                .records
                .iter()
                .take(HEALTH_SAMPLE_SIZE)
                .cloned()
                .collect(),
        },
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/api/health", get(health_check))
}
