//! # Roster Common Library
//!
//! Enrollment sheet ingestion shared by the Roster service:
//! - CSV parsing and record normalization
//! - Sheet source client
//! - In-memory cache store and sync orchestration
//! - Read-only projections (overview, recent list, categories, trends)
//! - Configuration loading

pub mod config;
pub mod csv_parser;
pub mod error;
pub mod fetcher;
pub mod normalize;
pub mod pagination;
pub mod query;
pub mod record;
pub mod sample;
pub mod store;
pub mod sync;
pub mod time;

pub use error::{Error, Result, SyncError};
pub use record::{EnrollmentRecord, RawRow};
pub use store::{CacheSnapshot, CacheStore, DataOrigin};
pub use sync::{SyncOrchestrator, SyncOutcome};
