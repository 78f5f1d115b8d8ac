//! Bike-share station sensor.

use std::sync::Arc;

use tracing::debug;

use crate::feed::{FeedFetcher, FeedSource, RefreshOutcome};
use crate::stations::{StationId, StationRecord};

use super::error::SensorError;
use super::state::{SensorState, StationAttributes, UNIT_OF_MEASUREMENT};

/// A sensor for one configured station.
///
/// Holds a snapshot of its station's record, taken on every [`poll`].
/// Reads before the station has appeared in any feed fail with
/// [`SensorError::UnknownStation`].
///
/// [`poll`]: BikeShareSensor::poll
pub struct BikeShareSensor<S> {
    fetcher: Arc<FeedFetcher<S>>,
    name: String,
    station_id: StationId,
    icon: String,
    /// Configured but not surfaced in the sensor state.
    icon_electric: String,
    record: Option<StationRecord>,
}

impl<S: FeedSource> BikeShareSensor<S> {
    /// Create a sensor on a shared fetcher. No data is read until the first
    /// [`poll`](Self::poll).
    pub fn new(
        fetcher: Arc<FeedFetcher<S>>,
        name: impl Into<String>,
        station_id: StationId,
        icon: impl Into<String>,
        icon_electric: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            name: name.into(),
            station_id,
            icon: icon.into(),
            icon_electric: icon_electric.into(),
            record: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn station_id(&self) -> &StationId {
        &self.station_id
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn icon_electric(&self) -> &str {
        &self.icon_electric
    }

    pub fn unit_of_measurement(&self) -> &'static str {
        UNIT_OF_MEASUREMENT
    }

    /// Trigger the shared (throttled) refresh, then re-read this station's
    /// record.
    ///
    /// The record is re-read even when the refresh fails; a failed refresh
    /// leaves the registry as it was, so the snapshot stays valid.
    pub async fn poll(&mut self) -> Result<RefreshOutcome, SensorError> {
        let outcome = self.fetcher.refresh().await;
        self.record = self.fetcher.registry().get(&self.station_id).await;

        debug!(
            sensor = %self.name,
            station = %self.station_id,
            known = self.record.is_some(),
            "sensor polled"
        );

        Ok(outcome?)
    }

    fn record(&self) -> Result<&StationRecord, SensorError> {
        self.record
            .as_ref()
            .ok_or_else(|| SensorError::UnknownStation(self.station_id.clone()))
    }

    /// Bikes available at the station.
    pub fn value(&self) -> Result<Option<u32>, SensorError> {
        Ok(self.record()?.num_bikes_available)
    }

    pub fn attributes(&self) -> Result<StationAttributes, SensorError> {
        Ok(StationAttributes::from(self.record()?))
    }

    /// The full state to publish.
    pub fn state(&self) -> Result<SensorState, SensorError> {
        let record = self.record()?;
        Ok(SensorState {
            name: self.name.clone(),
            station_id: self.station_id.clone(),
            value: record.num_bikes_available,
            unit_of_measurement: UNIT_OF_MEASUREMENT,
            icon: self.icon.clone(),
            attributes: StationAttributes::from(record),
        })
    }
}
