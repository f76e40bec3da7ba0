//! Full record dump

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use roster_common::query;
use roster_common::{DataOrigin, EnrollmentRecord};
use serde::Serialize;

use crate::AppState;

/// Raw dump response
#[derive(Debug, Serialize)]
pub struct RawDataResponse {
    pub data: Vec<EnrollmentRecord>,
    pub metadata: RawMetadata,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMetadata {
    pub total_records: usize,
    pub last_sync: Option<DateTime<Utc>>,
    pub is_loading: bool,
    pub origin: DataOrigin,
    /// Keys of the first record; empty when the cache is empty
    pub fields: Vec<String>,
}

/// GET /api/sheets/raw
pub async fn raw_sheet_data(State(state): State<AppState>) -> Json<RawDataResponse> {
    let snapshot = state.store.snapshot().await;
    let metadata = RawMetadata {
        total_records: snapshot.records.len(),
        last_sync: snapshot.last_sync,
        is_loading: snapshot.is_loading,
        origin: snapshot.origin,
        fields: query::field_names(&snapshot.records),
    };

    Json(RawDataResponse {
        data: snapshot.records.to_vec(),
        metadata,
    })
}
