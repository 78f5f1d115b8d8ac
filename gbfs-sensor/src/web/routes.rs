//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::sensor::SensorState;
use crate::stations::{StationId, StationRecord};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/sensors", get(list_sensors))
        .route("/sensors/:name", get(get_sensor))
        .route("/stations/:id", get(get_station))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        stations: state.registry.len().await,
        sensors: state.board.len().await,
    })
}

/// All published sensor states.
async fn list_sensors(State(state): State<AppState>) -> Json<SensorsResponse> {
    Json(SensorsResponse {
        sensors: state.board.all().await,
    })
}

/// One sensor's state by display name.
async fn get_sensor(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<SensorState>, AppError> {
    state
        .board
        .get(&name)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound {
            message: format!("no state for sensor: {name}"),
        })
}

/// The merged record of any station in the registry.
async fn get_station(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StationRecord>, AppError> {
    let id = StationId::new(id);
    state
        .registry
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound {
            message: format!("unknown station: {id}"),
        })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    NotFound { message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
        };

        warn!(%status, %message, "request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
