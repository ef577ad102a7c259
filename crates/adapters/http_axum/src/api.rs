//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod realtime;
#[allow(clippy::missing_errors_doc)]
pub mod sensors;

use axum::Router;
use axum::routing::{get, post};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Sensors
        .route("/sensors", get(sensors::definitions))
        .route("/sensors/", get(sensors::definitions))
        .route("/sensors/status", get(sensors::status))
        .route("/sensors/definitions", get(sensors::definitions))
        .route("/sensors/data/all", get(sensors::all_data))
        .route("/sensors/{sensor_id}", get(sensors::get))
        .route("/sensors/{sensor_id}/data", get(sensors::data))
        // Real-time
        .route("/realtime/broadcast", post(realtime::broadcast))
        .route("/realtime/stats", get(realtime::stats))
}
