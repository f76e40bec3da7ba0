//! Common error types for Roster

use thiserror::Error;

/// Common result type for Roster operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Roster crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Sheet ingestion failure
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),
}

/// Failures of the fetch → parse → normalize → store pipeline
///
/// Carries owned strings rather than source errors so a failure can be
/// cloned into logs, HTTP responses and the health snapshot alike.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Upstream answered with a non-success HTTP status
    #[error("HTTP error! status: {status}")]
    FetchError { status: u16 },

    /// Transport failure reaching upstream (DNS, refused, reset, timeout)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// CSV text the reader could not make sense of
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Another sync currently holds the single-flight gate
    #[error("A sync is already in progress")]
    SyncInProgress,
}

impl SyncError {
    /// Map a reqwest failure onto the taxonomy
    ///
    /// Status errors (from `error_for_status`) become `FetchError`, every
    /// other failure is a transport problem.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        match err.status() {
            Some(status) => SyncError::FetchError {
                status: status.as_u16(),
            },
            None if err.is_timeout() => {
                SyncError::NetworkError(format!("request timed out: {}", err))
            }
            None => SyncError::NetworkError(err.to_string()),
        }
    }
}
