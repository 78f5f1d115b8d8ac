//! Throttled feed refresh.
//!
//! One [`FeedFetcher`] is shared (via `Arc`) by every sensor reading the same
//! provider. It owns the last-refresh instant, so however many sensors poll,
//! at most one status + info round trip happens per interval.

use std::time::Duration;

use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::stations::StationRegistry;

use super::client::FeedSource;
use super::error::FeedError;

/// Default minimum time between two refreshes.
pub const DEFAULT_MIN_REFRESH: Duration = Duration::from_secs(60);

/// When to fetch the `station_information` document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfoRefreshPolicy {
    /// Every refresh, keeping names and coordinates current.
    #[default]
    Always,
    /// Only while the registry is empty or the status document names a
    /// station the registry does not know.
    OnDemand,
}

/// Configuration for the fetcher.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Minimum time between two successful refreshes.
    pub min_refresh: Duration,

    /// When to fetch station information.
    pub info_refresh: InfoRefreshPolicy,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            min_refresh: DEFAULT_MIN_REFRESH,
            info_refresh: InfoRefreshPolicy::default(),
        }
    }
}

/// Result of a successful [`FeedFetcher::refresh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The last refresh is recent enough; nothing was fetched.
    Throttled,
    /// The feed was fetched and merged.
    Refreshed {
        /// Stations in the registry after the merge.
        stations: usize,
    },
}

/// Fetches the feed into a [`StationRegistry`], at most once per interval.
pub struct FeedFetcher<S> {
    source: S,
    registry: StationRegistry,
    config: FetcherConfig,
    /// Instant of the last successful refresh. Held for the whole refresh so
    /// concurrent callers wait and then see the fresh timestamp.
    last_refresh: Mutex<Option<Instant>>,
}

impl<S: FeedSource> FeedFetcher<S> {
    /// Create a fetcher that has never refreshed.
    pub fn new(source: S, registry: StationRegistry, config: FetcherConfig) -> Self {
        Self {
            source,
            registry,
            config,
            last_refresh: Mutex::new(None),
        }
    }

    /// The registry this fetcher writes into.
    pub fn registry(&self) -> &StationRegistry {
        &self.registry
    }

    /// The underlying feed source.
    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Instant of the last successful refresh, if any.
    pub async fn last_refresh(&self) -> Option<Instant> {
        *self.last_refresh.lock().await
    }

    /// Refresh the registry unless the last successful refresh is younger
    /// than the configured interval.
    ///
    /// On error the registry is untouched and the throttle window is not
    /// consumed, so the next call tries again.
    pub async fn refresh(&self) -> Result<RefreshOutcome, FeedError> {
        let mut last = self.last_refresh.lock().await;

        if let Some(at) = *last
            && at.elapsed() < self.config.min_refresh
        {
            debug!(elapsed = ?at.elapsed(), "refresh throttled");
            return Ok(RefreshOutcome::Throttled);
        }

        let stations = self.fetch_and_merge().await?;
        *last = Some(Instant::now());
        Ok(RefreshOutcome::Refreshed { stations })
    }

    /// Refresh the registry regardless of the throttle.
    pub async fn force_refresh(&self) -> Result<RefreshOutcome, FeedError> {
        let mut last = self.last_refresh.lock().await;
        let stations = self.fetch_and_merge().await?;
        *last = Some(Instant::now());
        Ok(RefreshOutcome::Refreshed { stations })
    }

    /// Fetch both documents, then merge them in one step.
    ///
    /// Nothing is written unless every fetched document parsed.
    async fn fetch_and_merge(&self) -> Result<usize, FeedError> {
        let status = self.source.station_status().await?.into_stations();

        let needs_info = match self.config.info_refresh {
            InfoRefreshPolicy::Always => true,
            InfoRefreshPolicy::OnDemand => {
                self.registry.is_empty().await || self.registry.has_unknown(&status).await
            }
        };

        let info = if needs_info {
            Some(self.source.station_information().await?.into_stations())
        } else {
            None
        };

        let summary = self.registry.merge(status, info).await;
        let stations = self.registry.len().await;

        if !summary.unresolved.is_empty() {
            warn!(
                unresolved = ?summary.unresolved,
                "status entries for stations missing from station information"
            );
        }
        info!(
            stations,
            status_applied = summary.status_applied,
            created = summary.created,
            info_fetched = needs_info,
            "refreshed station feed"
        );

        Ok(stations)
    }
}
