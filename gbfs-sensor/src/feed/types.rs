//! GBFS document types.
//!
//! Both the `station_information` and `station_status` documents share the
//! same envelope: `{ "data": { "stations": [ ... ] } }`. Only the fields the
//! sensors surface are deserialized; anything else in an entry is ignored.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};

use crate::stations::StationId;

use super::error::FeedError;

/// Top-level GBFS document envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedDocument<T> {
    pub data: FeedData<T>,
}

/// The `data` object of a GBFS document.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedData<T> {
    pub stations: Vec<T>,
}

/// Parsed `station_status` document.
pub type StatusDocument = FeedDocument<StationStatusEntry>;

/// Parsed `station_information` document.
pub type InfoDocument = FeedDocument<StationInfoEntry>;

impl<T> FeedDocument<T> {
    /// Consume the document, returning its station entries.
    pub fn into_stations(self) -> Vec<T> {
        self.data.stations
    }
}

/// One entry of the `station_status` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationStatusEntry {
    pub station_id: StationId,
    pub num_bikes_available: u32,
    pub num_ebikes_available: u32,
    pub num_docks_available: u32,
    pub station_status: String,
    /// POSIX timestamp (seconds) of the station's last report.
    pub last_reported: i64,
    #[serde(deserialize_with = "flag")]
    pub is_returning: bool,
    #[serde(deserialize_with = "flag")]
    pub is_renting: bool,
}

/// One entry of the `station_information` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationInfoEntry {
    pub station_id: StationId,
    pub name: String,
    pub lon: f64,
    pub lat: f64,
}

/// Parse a GBFS document body.
///
/// `url` is only used to label the error.
pub fn parse_document<T: DeserializeOwned>(
    url: &str,
    body: &str,
) -> Result<FeedDocument<T>, FeedError> {
    serde_json::from_str(body).map_err(|e| FeedError::Json {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// GBFS 1.0 encodes booleans as `0`/`1`; later versions use JSON booleans.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(u8),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Int(0) => Ok(false),
        Flag::Int(1) => Ok(true),
        Flag::Int(n) => Err(D::Error::custom(format!("expected 0 or 1, got {n}"))),
    }
}
