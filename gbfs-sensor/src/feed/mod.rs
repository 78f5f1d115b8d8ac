//! GBFS feed access.
//!
//! A provider publishes two documents that are merged per station:
//! - `station_information`: mostly static (name, coordinates)
//! - `station_status`: live counts and flags
//!
//! [`FeedClient`] fetches them over HTTP, [`MockFeed`] serves canned bodies,
//! and [`FeedFetcher`] merges either into a shared registry at most once per
//! interval.

mod client;
mod error;
mod fetcher;
mod mock;
mod types;

#[cfg(test)]
mod fetcher_tests;

pub use client::{FeedClient, FeedClientConfig, FeedSource};
pub use error::FeedError;
pub use fetcher::{
    DEFAULT_MIN_REFRESH, FeedFetcher, FetcherConfig, InfoRefreshPolicy, RefreshOutcome,
};
pub use mock::{EMPTY_DOCUMENT, MockFeed};
pub use types::{
    FeedData, FeedDocument, InfoDocument, StationInfoEntry, StationStatusEntry, StatusDocument,
    parse_document,
};
