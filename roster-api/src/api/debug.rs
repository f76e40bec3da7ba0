//! Diagnostics against the configured sheet URL
//!
//! Both endpoints talk to the upstream directly and never touch the cache.

use axum::{extract::State, Json};
use roster_common::fetcher::SourceProbe;
use serde::Serialize;
use tracing::warn;

use crate::{ApiError, ApiResult, AppState};

/// Leading lines echoed by the raw CSV preview
const PREVIEW_LINES: usize = 5;

/// GET /api/debug/sheets-url
pub async fn probe_sheet_url(State(state): State<AppState>) -> ApiResult<Json<SourceProbe>> {
    let probe = state.orchestrator.source().probe().await.map_err(|e| {
        warn!(error = %e, "Sheet URL probe failed");
        ApiError::Upstream(e)
    })?;
    Ok(Json(probe))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvPreview {
    /// Body length in bytes
    pub csv_length: usize,
    pub first_lines: Vec<String>,
    pub total_lines: usize,
}

impl CsvPreview {
    fn from_body(body: &str) -> Self {
        let lines: Vec<&str> = body.split('\n').collect();
        Self {
            csv_length: body.len(),
            first_lines: lines
                .iter()
                .take(PREVIEW_LINES)
                .map(|line| line.trim_end_matches('\r').to_string())
                .collect(),
            total_lines: lines.len(),
        }
    }
}

/// GET /api/debug/raw-csv
pub async fn raw_csv_preview(State(state): State<AppState>) -> ApiResult<Json<CsvPreview>> {
    let body = state.orchestrator.source().fetch_csv().await.map_err(|e| {
        warn!(error = %e, "Raw CSV fetch failed");
        ApiError::Upstream(e)
    })?;
    Ok(Json(CsvPreview::from_body(&body)))
}
