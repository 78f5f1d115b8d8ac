//! In-memory feed for testing without a live provider.
//!
//! Serves canned document bodies through the same parser as the HTTP
//! client and counts requests, so throttling can be observed.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::client::FeedSource;
use super::error::FeedError;
use super::types::{InfoDocument, StatusDocument, parse_document};

const STATUS_URL: &str = "mock://station_status.json";
const INFO_URL: &str = "mock://station_information.json";

/// Mock GBFS feed backed by JSON strings.
#[derive(Debug)]
pub struct MockFeed {
    status_body: Mutex<String>,
    info_body: Mutex<String>,
    status_requests: AtomicUsize,
    info_requests: AtomicUsize,
}

impl MockFeed {
    /// Create a mock serving the given `station_status` and
    /// `station_information` bodies.
    pub fn new(status_body: impl Into<String>, info_body: impl Into<String>) -> Self {
        Self {
            status_body: Mutex::new(status_body.into()),
            info_body: Mutex::new(info_body.into()),
            status_requests: AtomicUsize::new(0),
            info_requests: AtomicUsize::new(0),
        }
    }

    /// A mock whose documents list no stations.
    pub fn empty() -> Self {
        Self::new(EMPTY_DOCUMENT, EMPTY_DOCUMENT)
    }

    /// Replace the `station_status` body served from now on.
    pub fn set_status(&self, body: impl Into<String>) {
        *lock(&self.status_body) = body.into();
    }

    /// Replace the `station_information` body served from now on.
    pub fn set_info(&self, body: impl Into<String>) {
        *lock(&self.info_body) = body.into();
    }

    /// Number of `station_status` requests served so far.
    pub fn status_requests(&self) -> usize {
        self.status_requests.load(Ordering::SeqCst)
    }

    /// Number of `station_information` requests served so far.
    pub fn info_requests(&self) -> usize {
        self.info_requests.load(Ordering::SeqCst)
    }
}

/// A GBFS document with no stations.
pub const EMPTY_DOCUMENT: &str = r#"{"data":{"stations":[]}}"#;

fn lock(body: &Mutex<String>) -> std::sync::MutexGuard<'_, String> {
    // A poisoned lock still holds a complete string.
    body.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl FeedSource for MockFeed {
    async fn station_status(&self) -> Result<StatusDocument, FeedError> {
        self.status_requests.fetch_add(1, Ordering::SeqCst);
        let body = lock(&self.status_body).clone();
        parse_document(STATUS_URL, &body)
    }

    async fn station_information(&self) -> Result<InfoDocument, FeedError> {
        self.info_requests.fetch_add(1, Ordering::SeqCst);
        let body = lock(&self.info_body).clone();
        parse_document(INFO_URL, &body)
    }
}
