//! Web layer for the bike-share sensors.
//!
//! Serves the latest published sensor states as JSON.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
