//! Published-sheet CSV client
//!
//! One GET per call, bounded by the client timeout. No retries here; the
//! sync orchestrator decides what a failure means.

use crate::error::SyncError;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

const USER_AGENT: &str = concat!("Roster/", env!("CARGO_PKG_VERSION"));

/// Where sheet CSV comes from
#[async_trait]
pub trait SheetSource: Send + Sync {
    /// Export URL, for logs and diagnostics
    fn url(&self) -> &str;

    /// Fetch the CSV body
    ///
    /// Non-2xx answers are `FetchError`, transport failures `NetworkError`.
    async fn fetch_csv(&self) -> Result<String, SyncError>;

    /// Issue a request and describe the answer without judging its status
    async fn probe(&self) -> Result<SourceProbe, SyncError>;
}

/// Upstream reachability report
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceProbe {
    pub url: String,
    pub status: u16,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
    pub accessible: bool,
}

/// [`SheetSource`] over HTTP
pub struct HttpSheetSource {
    http_client: reqwest::Client,
    url: String,
}

impl HttpSheetSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SyncError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            url: url.into(),
        })
    }

    async fn get(&self) -> Result<reqwest::Response, SyncError> {
        tracing::debug!(url = %self.url, "Requesting sheet export");
        self.http_client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| SyncError::from_reqwest(&e))
    }
}

#[async_trait]
impl SheetSource for HttpSheetSource {
    fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_csv(&self) -> Result<String, SyncError> {
        let response = self.get().await?;
        let status = response.status();

        if !status.is_success() {
            tracing::warn!(url = %self.url, status = status.as_u16(), "Sheet export returned error status");
            return Err(SyncError::FetchError {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| SyncError::from_reqwest(&e))?;

        tracing::debug!(url = %self.url, bytes = body.len(), "Fetched sheet export");
        Ok(body)
    }

    async fn probe(&self) -> Result<SourceProbe, SyncError> {
        let response = self.get().await?;
        let status = response.status();

        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        Ok(SourceProbe {
            url: self.url.clone(),
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            accessible: status.is_success(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let source = HttpSheetSource::new("http://127.0.0.1:1/sheet.csv", Duration::from_secs(1));
        assert!(source.is_ok());
        assert_eq!(source.unwrap().url(), "http://127.0.0.1:1/sheet.csv");
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Port 1 is never listening on a test host
        let source =
            HttpSheetSource::new("http://127.0.0.1:1/sheet.csv", Duration::from_secs(2)).unwrap();
        let err = source.fetch_csv().await.unwrap_err();
        assert!(matches!(err, SyncError::NetworkError(_)), "got {:?}", err);
    }
}
