//! JSON REST handlers for the broadcast scheduler.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use sensorcast_domain::envelope::BroadcastStats;

use crate::state::AppState;

/// Body returned by the manual broadcast endpoint.
#[derive(Debug, Serialize)]
pub struct BroadcastResponse {
    pub success: bool,
}

/// `POST /api/realtime/broadcast`
///
/// `success` is `false` when there was nobody to send to or nothing to send.
pub async fn broadcast(State(state): State<AppState>) -> Json<BroadcastResponse> {
    let success = state.pipeline.scheduler().force_broadcast().await;
    Json(BroadcastResponse { success })
}

/// `GET /api/realtime/stats`
pub async fn stats(State(state): State<AppState>) -> Json<BroadcastStats> {
    Json(state.pipeline.scheduler().stats())
}
