//! Application state for the web layer.

use crate::scheduler::SensorBoard;
use crate::stations::StationRegistry;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Latest sensor states, written by the scheduler
    pub board: SensorBoard,

    /// Merged station records, written by the fetcher
    pub registry: StationRegistry,
}

impl AppState {
    /// Create a new app state.
    pub fn new(board: SensorBoard, registry: StationRegistry) -> Self {
        Self { board, registry }
    }
}
