//! Bike-share station sensors.
//!
//! Polls a provider's GBFS `station_status` and `station_information`
//! documents and exposes each configured station as a sensor whose value is
//! the number of bikes available.

pub mod config;
pub mod feed;
pub mod scheduler;
pub mod sensor;
pub mod stations;
pub mod web;
