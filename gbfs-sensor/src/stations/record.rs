//! Station identity and the merged per-station record.

use std::borrow::Borrow;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::feed::{StationInfoEntry, StationStatusEntry};

/// A provider-assigned station identifier (GBFS `station_id`).
///
/// Opaque: compared byte for byte, never normalized.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(String);

impl StationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for StationId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StationId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for StationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Everything known about one station, merged from both documents.
///
/// Created from a `station_information` entry. Status fields stay `None`
/// until a `station_status` entry for the station has been applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationRecord {
    pub station_id: StationId,
    pub name: String,
    pub lon: f64,
    pub lat: f64,
    pub num_bikes_available: Option<u32>,
    pub num_ebikes_available: Option<u32>,
    pub num_docks_available: Option<u32>,
    pub station_status: Option<String>,
    /// POSIX timestamp (seconds).
    pub last_reported: Option<i64>,
    pub is_returning: Option<bool>,
    pub is_renting: Option<bool>,
}

impl StationRecord {
    /// Create a record with identity and location only.
    pub fn new(station_id: StationId, name: impl Into<String>, lon: f64, lat: f64) -> Self {
        Self {
            station_id,
            name: name.into(),
            lon,
            lat,
            num_bikes_available: None,
            num_ebikes_available: None,
            num_docks_available: None,
            station_status: None,
            last_reported: None,
            is_returning: None,
            is_renting: None,
        }
    }

    /// Create a record from a `station_information` entry.
    pub fn from_info(entry: StationInfoEntry) -> Self {
        Self::new(entry.station_id, entry.name, entry.lon, entry.lat)
    }

    /// Overwrite name and coordinates.
    pub fn apply_info(&mut self, entry: StationInfoEntry) {
        self.name = entry.name;
        self.lon = entry.lon;
        self.lat = entry.lat;
    }

    /// Overwrite every status field.
    pub fn apply_status(&mut self, entry: &StationStatusEntry) {
        self.num_bikes_available = Some(entry.num_bikes_available);
        self.num_ebikes_available = Some(entry.num_ebikes_available);
        self.num_docks_available = Some(entry.num_docks_available);
        self.station_status = Some(entry.station_status.clone());
        self.last_reported = Some(entry.last_reported);
        self.is_returning = Some(entry.is_returning);
        self.is_renting = Some(entry.is_renting);
    }

    /// Whether any `station_status` entry has been applied yet.
    pub fn has_status(&self) -> bool {
        self.station_status.is_some()
    }

    /// `last_reported` as a UTC datetime.
    pub fn last_reported_at(&self) -> Option<DateTime<Utc>> {
        self.last_reported
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}
