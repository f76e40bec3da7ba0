//! Fetch → parse → normalize → store
//!
//! At most one sync runs at a time. A request that finds the gate taken is
//! turned away with [`SyncError::SyncInProgress`] instead of racing the
//! in-flight sync for the final cache write.

use crate::config::ProgressFallbackConfig;
use crate::csv_parser::parse_csv;
use crate::error::SyncError;
use crate::fetcher::SheetSource;
use crate::normalize::{Normalizer, ProgressFallback};
use crate::sample::sample_records;
use crate::store::{CacheStore, DataOrigin};
use crate::time;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Result of a successful sync
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOutcome {
    pub records_processed: usize,
    pub synced_at: DateTime<Utc>,
}

/// Coordinates one sheet source with one cache store
pub struct SyncOrchestrator {
    store: Arc<CacheStore>,
    source: Arc<dyn SheetSource>,
    progress_fallback: ProgressFallbackConfig,
    gate: Mutex<()>,
}

impl SyncOrchestrator {
    pub fn new(
        store: Arc<CacheStore>,
        source: Arc<dyn SheetSource>,
        progress_fallback: ProgressFallbackConfig,
    ) -> Self {
        Self {
            store,
            source,
            progress_fallback,
            gate: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<CacheStore> {
        &self.store
    }

    pub fn source(&self) -> &Arc<dyn SheetSource> {
        &self.source
    }

    /// Replace the cached record set with a fresh read of the sheet
    ///
    /// On failure the cache keeps its previous generation and the error is
    /// returned unchanged. The loading flag is lowered on every exit path.
    pub async fn sync(&self) -> Result<SyncOutcome, SyncError> {
        let _permit = self.gate.try_lock().map_err(|_| {
            debug!("Sync requested while another is in flight");
            SyncError::SyncInProgress
        })?;
        let _loading = self.store.begin_loading();

        info!(url = %self.source.url(), "Fetching sheet data");
        let started = Instant::now();

        let result = self.fetch_and_store().await;
        match &result {
            Ok(outcome) => info!(
                records = outcome.records_processed,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Sheet sync completed"
            ),
            Err(e) => error!(
                error = %e,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Sheet sync failed"
            ),
        }
        result
    }

    async fn fetch_and_store(&self) -> Result<SyncOutcome, SyncError> {
        let csv_text = self.source.fetch_csv().await?;
        let rows = parse_csv(&csv_text)?;

        let mut normalizer = Normalizer::new(
            time::today(),
            ProgressFallback::from_config(self.progress_fallback),
        );
        let records = normalizer.normalize_all(&rows);
        let records_processed = records.len();

        let synced_at = time::now();
        self.store
            .replace(records, DataOrigin::Sheet, synced_at)
            .await;

        Ok(SyncOutcome {
            records_processed,
            synced_at,
        })
    }

    /// Install the built-in sample set unless sheet data is already cached
    ///
    /// Only the startup path calls this; later failures keep stale data.
    pub async fn install_sample_fallback(&self) -> bool {
        let installed = self.store.install_sample(sample_records(), time::now()).await;
        if installed {
            warn!("Using sample data as fallback");
        }
        installed
    }

    /// Re-sync every `period` until the handle is aborted
    ///
    /// The first sync happens one full period after the call.
    pub fn spawn_interval_refresh(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            info!(period_secs = period.as_secs(), "Interval refresh enabled");

            loop {
                ticker.tick().await;
                match self.sync().await {
                    Ok(_) => {}
                    Err(SyncError::SyncInProgress) => {
                        debug!("Skipping refresh tick, sync already running")
                    }
                    Err(e) => warn!(error = %e, "Interval refresh failed, serving cached data"),
                }
            }
        })
    }
}
