//! roster-api library - enrollment sheet HTTP service
//!
//! Serves dashboard projections of the cached enrollment sheet and a manual
//! resync trigger.

use axum::Router;
use chrono::{DateTime, Utc};
use roster_common::{CacheStore, SyncOrchestrator};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod startup;

pub use crate::error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Record cache (handlers only read it)
    pub store: Arc<CacheStore>,
    /// Sync pipeline behind the manual trigger and debug probes
    pub orchestrator: Arc<SyncOrchestrator>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create application state around an orchestrator and its store
    pub fn new(orchestrator: Arc<SyncOrchestrator>) -> Self {
        Self {
            store: Arc::clone(orchestrator.store()),
            orchestrator,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/api/enrollment/overview", get(api::enrollment_overview))
        .route("/api/enrollment/recent", get(api::recent_enrollments))
        .route("/api/enrollment/categories", get(api::enrollment_categories))
        .route("/api/enrollment/trends", get(api::enrollment_trends))
        .route("/api/sheets/raw", get(api::raw_sheet_data))
        .route("/api/sync/google-sheets", post(api::trigger_sync))
        .route("/api/students/search", get(api::search_students))
        .route("/api/students/:id", get(api::get_student))
        .route("/api/debug/sheets-url", get(api::probe_sheet_url))
        .route("/api/debug/raw-csv", get(api::raw_csv_preview))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes())
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
