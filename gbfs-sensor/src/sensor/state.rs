//! Sensor output types.

use serde::Serialize;

use crate::stations::{StationId, StationRecord};

/// Unit of a sensor's value.
pub const UNIT_OF_MEASUREMENT: &str = "bikes";

/// The fixed attribute set published alongside a sensor's value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationAttributes {
    pub station_name: String,
    pub station_status: Option<String>,
    pub num_bikes_available: Option<u32>,
    pub num_ebikes_available: Option<u32>,
    pub num_docks_available: Option<u32>,
    pub is_returning: Option<bool>,
    pub is_renting: Option<bool>,
    pub last_reported: Option<i64>,
    pub longitude: f64,
    pub latitude: f64,
}

impl From<&StationRecord> for StationAttributes {
    fn from(record: &StationRecord) -> Self {
        Self {
            station_name: record.name.clone(),
            station_status: record.station_status.clone(),
            num_bikes_available: record.num_bikes_available,
            num_ebikes_available: record.num_ebikes_available,
            num_docks_available: record.num_docks_available,
            is_returning: record.is_returning,
            is_renting: record.is_renting,
            last_reported: record.last_reported,
            longitude: record.lon,
            latitude: record.lat,
        }
    }
}

/// Everything the presentation layer needs to render one sensor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorState {
    /// Display name from configuration
    pub name: String,
    pub station_id: StationId,
    /// Bikes available; `None` until the station's status is known
    pub value: Option<u32>,
    pub unit_of_measurement: &'static str,
    pub icon: String,
    pub attributes: StationAttributes,
}
