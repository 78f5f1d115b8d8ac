//! Sensor polling loop.
//!
//! Polls every sensor in turn on a fixed interval and publishes each
//! sensor's state to a [`SensorBoard`] for the web layer. The interval is
//! independent of the fetcher's throttle: polling more often than the
//! throttle allows just re-reads the registry.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::config::Config;
use crate::feed::{FeedFetcher, FeedSource};
use crate::sensor::{BikeShareSensor, SensorError, SensorState};

/// Latest published state of every sensor, keyed by sensor name.
#[derive(Clone, Default)]
pub struct SensorBoard {
    inner: Arc<RwLock<BTreeMap<String, SensorState>>>,
}

impl SensorBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a sensor's state, replacing any previous one.
    pub async fn publish(&self, state: SensorState) {
        let mut guard = self.inner.write().await;
        guard.insert(state.name.clone(), state);
    }

    pub async fn get(&self, name: &str) -> Option<SensorState> {
        let guard = self.inner.read().await;
        guard.get(name).cloned()
    }

    /// All published states, ordered by sensor name.
    pub async fn all(&self) -> Vec<SensorState> {
        let guard = self.inner.read().await;
        guard.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        let guard = self.inner.read().await;
        guard.len()
    }

    pub async fn is_empty(&self) -> bool {
        let guard = self.inner.read().await;
        guard.is_empty()
    }
}

/// Counts from one pass over all sensors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// Sensors whose state was published.
    pub published: usize,
    /// Sensors whose refresh failed.
    pub failed: usize,
    /// Sensors whose station is not in the registry.
    pub unknown: usize,
}

/// Owns the sensors and drives their polling.
pub struct Scheduler<S> {
    sensors: Vec<BikeShareSensor<S>>,
    board: SensorBoard,
    interval: Duration,
}

impl<S: FeedSource> Scheduler<S> {
    pub fn new(sensors: Vec<BikeShareSensor<S>>, board: SensorBoard, interval: Duration) -> Self {
        Self {
            sensors,
            board,
            interval,
        }
    }

    /// Build one sensor per configured station, all on `fetcher`.
    pub fn from_config(config: &Config, fetcher: Arc<FeedFetcher<S>>, board: SensorBoard) -> Self {
        let sensors = config
            .stations
            .iter()
            .map(|station| {
                BikeShareSensor::new(
                    Arc::clone(&fetcher),
                    &station.name,
                    station.station_id.clone(),
                    &config.icon,
                    &config.icon_electric,
                )
            })
            .collect();

        Self::new(sensors, board, config.poll_interval())
    }

    pub fn sensors(&self) -> &[BikeShareSensor<S>] {
        &self.sensors
    }

    /// Poll every sensor once, in order, and publish what can be read.
    ///
    /// A failed refresh still publishes the sensor's previous snapshot.
    pub async fn poll_all(&mut self) -> PollSummary {
        let mut summary = PollSummary::default();

        for sensor in &mut self.sensors {
            if let Err(e) = sensor.poll().await {
                warn!(sensor = %sensor.name(), error = %e, "sensor poll failed");
                summary.failed += 1;
            }

            match sensor.state() {
                Ok(state) => {
                    self.board.publish(state).await;
                    summary.published += 1;
                }
                Err(SensorError::UnknownStation(id)) => {
                    warn!(sensor = %sensor.name(), station = %id, "station not found in feed");
                    summary.unknown += 1;
                }
                Err(e) => warn!(sensor = %sensor.name(), error = %e, "sensor read failed"),
            }
        }

        summary
    }

    /// Poll forever. The first pass runs immediately.
    pub async fn run(mut self) {
        info!(
            sensors = self.sensors.len(),
            interval = ?self.interval,
            "starting sensor polling"
        );

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let summary = self.poll_all().await;
            info!(
                published = summary.published,
                failed = summary.failed,
                unknown = summary.unknown,
                "polled sensors"
            );
        }
    }
}
