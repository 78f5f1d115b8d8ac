//! Station identity, records, and the shared registry.
//!
//! The registry merges the GBFS `station_information` and `station_status`
//! documents into one record per station id.

mod record;
mod registry;

pub use record::{StationId, StationRecord};
pub use registry::{MergeSummary, StationRegistry};
