//! GBFS HTTP client.

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, error};

use super::error::FeedError;
use super::types::{FeedDocument, InfoDocument, StatusDocument, parse_document};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A source of the two GBFS station documents.
///
/// Implemented by [`FeedClient`] for live feeds and by
/// [`MockFeed`](super::MockFeed) for canned data.
pub trait FeedSource: Send + Sync {
    /// Fetch and parse the `station_status` document.
    fn station_status(&self) -> impl Future<Output = Result<StatusDocument, FeedError>> + Send;

    /// Fetch and parse the `station_information` document.
    fn station_information(&self)
    -> impl Future<Output = Result<InfoDocument, FeedError>> + Send;
}

/// Configuration for the GBFS client.
#[derive(Debug, Clone)]
pub struct FeedClientConfig {
    /// URL of the `station_status` document
    pub station_status_url: String,
    /// URL of the `station_information` document
    pub station_info_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl FeedClientConfig {
    /// Create a new config for the given document URLs.
    pub fn new(station_status_url: impl Into<String>, station_info_url: impl Into<String>) -> Self {
        Self {
            station_status_url: station_status_url.into(),
            station_info_url: station_info_url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Client for a provider's GBFS station documents.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    station_status_url: String,
    station_info_url: String,
}

impl FeedClient {
    /// Create a new GBFS client.
    pub fn new(config: FeedClientConfig) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            station_status_url: config.station_status_url,
            station_info_url: config.station_info_url,
        })
    }

    /// GET a document and parse it.
    ///
    /// A non-success status is logged and the body is parsed regardless.
    /// A body that does not parse fails with [`FeedError::Json`].
    async fn fetch_document<T: DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<FeedDocument<T>, FeedError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            debug!(%url, %status, bytes = body.len(), "fetched feed document");
        } else {
            error!(%url, %status, %body, "feed returned non-success status");
        }

        parse_document(url, &body)
    }
}

impl FeedSource for FeedClient {
    async fn station_status(&self) -> Result<StatusDocument, FeedError> {
        self.fetch_document(&self.station_status_url).await
    }

    async fn station_information(&self) -> Result<InfoDocument, FeedError> {
        self.fetch_document(&self.station_info_url).await
    }
}
