//! Startup sync policy
//!
//! The first sync of a process is the only one whose failure is swallowed:
//! the built-in sample set is installed so the dashboard is never blank.
//! Every later failure is reported to its caller and leaves the cache alone.

use roster_common::{DataOrigin, SyncError, SyncOrchestrator};
use tracing::{error, info};

/// Run the initial sync, falling back to sample data on failure
///
/// Returns the origin of whatever the cache holds afterwards.
pub async fn initial_sync(orchestrator: &SyncOrchestrator) -> DataOrigin {
    match orchestrator.sync().await {
        Ok(outcome) => {
            info!(
                records = outcome.records_processed,
                "Loaded records from Google Sheets"
            );
            DataOrigin::Sheet
        }
        Err(SyncError::SyncInProgress) => {
            // Another caller holds the gate and will fill the cache itself
            info!("Startup sync skipped, a sync is already running");
            orchestrator.store().snapshot().await.origin
        }
        Err(e) => {
            error!(error = %e, "Failed to fetch Google Sheets data on startup");
            orchestrator.install_sample_fallback().await;
            orchestrator.store().snapshot().await.origin
        }
    }
}
