//! Sensor error types.

use crate::feed::FeedError;
use crate::stations::StationId;

/// Errors surfaced by a sensor.
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    /// The station has not appeared in any fetched feed
    #[error("unknown station: {0}")]
    UnknownStation(StationId),

    /// The shared feed refresh failed
    #[error("feed refresh failed: {0}")]
    Feed(#[from] FeedError),
}
