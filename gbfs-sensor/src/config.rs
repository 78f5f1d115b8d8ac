//! Sensor configuration.
//!
//! Loaded from a TOML file:
//!
//! ```toml
//! station_status_url = "https://example.com/gbfs/en/station_status.json"
//! station_info_url = "https://example.com/gbfs/en/station_information.json"
//! icon = "mdi:bicycle"                  # optional
//! icon_electric = "mdi:bicycle-electric" # optional
//!
//! [[stations]]
//! name = "Office"
//! stationid = "42"
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::feed::{DEFAULT_MIN_REFRESH, FeedClientConfig, FetcherConfig, InfoRefreshPolicy};
use crate::stations::StationId;

pub const DEFAULT_ICON: &str = "mdi:bicycle";
pub const DEFAULT_ELECTRIC_ICON: &str = "mdi:bicycle-electric";

/// Default time between two scheduler passes.
const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// URL of the GBFS `station_status` document
    pub station_status_url: String,

    /// URL of the GBFS `station_information` document
    pub station_info_url: String,

    #[serde(default = "default_icon")]
    pub icon: String,

    /// Carried through to sensors but not displayed.
    #[serde(default = "default_icon_electric")]
    pub icon_electric: String,

    /// Minimum seconds between two feed refreshes
    #[serde(default = "default_min_refresh_secs")]
    pub min_refresh_secs: u64,

    /// Seconds between two scheduler passes over all sensors
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub info_refresh: InfoRefreshPolicy,

    pub stations: Vec<StationConfig>,
}

/// One configured sensor.
#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    /// Display name of the sensor
    pub name: String,

    #[serde(rename = "stationid", alias = "station_id")]
    pub station_id: StationId,
}

fn default_icon() -> String {
    DEFAULT_ICON.to_string()
}

fn default_icon_electric() -> String {
    DEFAULT_ELECTRIC_ICON.to_string()
}

fn default_min_refresh_secs() -> u64 {
    DEFAULT_MIN_REFRESH.as_secs()
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Config {
    /// Read, parse, and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    /// Parse and validate a config from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make the service misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_refresh_secs == 0 {
            return Err(ConfigError::Invalid(
                "min_refresh_secs must be greater than zero".to_string(),
            ));
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_secs must be greater than zero".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for station in &self.stations {
            if !names.insert(station.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate sensor name: {}",
                    station.name
                )));
            }
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Settings for the HTTP client.
    pub fn client_config(&self) -> FeedClientConfig {
        FeedClientConfig::new(&self.station_status_url, &self.station_info_url)
            .with_timeout(self.timeout_secs)
    }

    /// Settings for the shared fetcher.
    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            min_refresh: Duration::from_secs(self.min_refresh_secs),
            info_refresh: self.info_refresh,
        }
    }
}
