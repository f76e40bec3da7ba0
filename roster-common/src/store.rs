//! In-memory cache of the latest record generation
//!
//! One [`CacheStore`] per process, shared by `Arc` between the sync
//! orchestrator (the only writer) and the HTTP handlers (readers). The
//! record set is an `Arc<[EnrollmentRecord]>` replaced in one assignment, so
//! a reader holds either the old or the new generation, never a mix.

use crate::record::EnrollmentRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Where the cached generation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataOrigin {
    /// Nothing loaded yet
    Empty,
    /// Last successful sheet sync
    Sheet,
    /// Built-in sample set installed after a failed startup sync
    Sample,
}

/// Point-in-time view of the cache
#[derive(Debug, Clone)]
pub struct CacheSnapshot {
    pub records: Arc<[EnrollmentRecord]>,
    pub last_sync: Option<DateTime<Utc>>,
    pub origin: DataOrigin,
    pub is_loading: bool,
}

#[derive(Debug)]
struct Generation {
    records: Arc<[EnrollmentRecord]>,
    last_sync: Option<DateTime<Utc>>,
    origin: DataOrigin,
}

/// Process-wide record cache
#[derive(Debug)]
pub struct CacheStore {
    current: RwLock<Generation>,
    loading: AtomicBool,
}

impl CacheStore {
    /// Empty cache: no records, never synced, not loading
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Generation {
                records: Arc::from(Vec::new()),
                last_sync: None,
                origin: DataOrigin::Empty,
            }),
            loading: AtomicBool::new(false),
        }
    }

    pub async fn snapshot(&self) -> CacheSnapshot {
        let current = self.current.read().await;
        CacheSnapshot {
            records: Arc::clone(&current.records),
            last_sync: current.last_sync,
            origin: current.origin,
            is_loading: self.is_loading(),
        }
    }

    /// Swap in a whole new generation
    pub async fn replace(
        &self,
        records: Vec<EnrollmentRecord>,
        origin: DataOrigin,
        synced_at: DateTime<Utc>,
    ) {
        let mut current = self.current.write().await;
        *current = Generation {
            records: Arc::from(records),
            last_sync: Some(synced_at),
            origin,
        };
    }

    /// Install `records` as sample data unless sheet data is already present
    ///
    /// Returns true if the records were installed.
    pub async fn install_sample(&self, records: Vec<EnrollmentRecord>, at: DateTime<Utc>) -> bool {
        let mut current = self.current.write().await;
        if current.origin == DataOrigin::Sheet {
            return false;
        }
        *current = Generation {
            records: Arc::from(records),
            last_sync: Some(at),
            origin: DataOrigin::Sample,
        };
        true
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Raise the loading flag until the returned guard is dropped
    pub fn begin_loading(&self) -> LoadingGuard<'_> {
        self.loading.store(true, Ordering::Release);
        LoadingGuard {
            flag: &self.loading,
        }
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Clears the loading flag on drop, on every exit path
#[must_use = "the loading flag is cleared as soon as the guard is dropped"]
pub struct LoadingGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::sample_records;

    #[tokio::test]
    async fn test_new_store_is_empty() {
        let store = CacheStore::new();
        let snap = store.snapshot().await;
        assert!(snap.records.is_empty());
        assert!(snap.last_sync.is_none());
        assert_eq!(snap.origin, DataOrigin::Empty);
        assert!(!snap.is_loading);
    }

    #[tokio::test]
    async fn test_replace_swaps_generation() {
        let store = CacheStore::new();
        let before = store.snapshot().await;

        let at = Utc::now();
        store.replace(sample_records(), DataOrigin::Sheet, at).await;

        let after = store.snapshot().await;
        assert_eq!(after.records.len(), 3);
        assert_eq!(after.last_sync, Some(at));
        assert_eq!(after.origin, DataOrigin::Sheet);
        // An earlier snapshot keeps its own generation
        assert!(before.records.is_empty());
    }

    #[tokio::test]
    async fn test_sample_never_overwrites_sheet_data() {
        let store = CacheStore::new();
        store.replace(Vec::new(), DataOrigin::Sheet, Utc::now()).await;
        assert!(!store.install_sample(sample_records(), Utc::now()).await);
        assert_eq!(store.snapshot().await.origin, DataOrigin::Sheet);
    }

    #[tokio::test]
    async fn test_sample_installs_on_empty_store() {
        let store = CacheStore::new();
        assert!(store.install_sample(sample_records(), Utc::now()).await);
        let snap = store.snapshot().await;
        assert_eq!(snap.origin, DataOrigin::Sample);
        assert!(snap.last_sync.is_some());
    }

    #[test]
    fn test_loading_guard_clears_flag() {
        let store = CacheStore::new();
        {
            let _guard = store.begin_loading();
            assert!(store.is_loading());
        }
        assert!(!store.is_loading());
    }
}
