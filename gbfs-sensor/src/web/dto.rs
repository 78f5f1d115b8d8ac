//! Response bodies for the JSON API.

use serde::Serialize;

use crate::sensor::SensorState;

/// Response for `GET /sensors`.
#[derive(Debug, Serialize)]
pub struct SensorsResponse {
    pub sensors: Vec<SensorState>,
}

/// Response for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Stations currently in the registry
    pub stations: usize,
    /// Sensors with a published state
    pub sensors: usize,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
