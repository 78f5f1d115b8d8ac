//! Per-station sensors.
//!
//! Each configured station becomes one [`BikeShareSensor`] whose value is the
//! number of bikes available, with the rest of the station record exposed as
//! typed attributes.

mod adapter;
mod error;
mod state;

pub use adapter::BikeShareSensor;
pub use error::SensorError;
pub use state::{SensorState, StationAttributes, UNIT_OF_MEASUREMENT};
