//! JSON REST handlers for sensors, definitions and cached readings.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use sensorcast_domain::definition::Definition;
use sensorcast_domain::provider::ProviderStatus;
use sensorcast_domain::reading::Reading;

use crate::error::ApiError;
use crate::state::AppState;

/// Query string accepted by the definitions endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct DefinitionsQuery {
    /// Restrict the list to one provider.
    pub source: Option<String>,
}

/// Query string accepted by the per-sensor data endpoint.
#[derive(Debug, Deserialize)]
pub struct DataQuery {
    /// Most recent readings to return, between 1 and 100.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

const MAX_LIMIT: usize = 100;

fn default_limit() -> usize {
    10
}

/// `GET /api/sensors/status`
pub async fn status(State(state): State<AppState>) -> Json<Vec<ProviderStatus>> {
    Json(state.pipeline.manager().provider_statuses().await)
}

/// `GET /api/sensors?source=` and `GET /api/sensors/definitions?source=`
pub async fn definitions(
    State(state): State<AppState>,
    Query(query): Query<DefinitionsQuery>,
) -> Json<Vec<Definition>> {
    let manager = state.pipeline.manager();
    let definitions = match query.source.as_deref() {
        Some(source) => manager.definitions_for_source(source).await,
        None => manager.list_definitions().await,
    };
    Json(definitions)
}

/// `GET /api/sensors/data/all`
pub async fn all_data(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, Vec<Reading>>>, ApiError> {
    let data = state.pipeline.manager().get_all_data().await?;
    Ok(Json(data))
}

/// `GET /api/sensors/{sensor_id}`
pub async fn get(
    State(state): State<AppState>,
    Path(sensor_id): Path<String>,
) -> Result<Json<Definition>, ApiError> {
    state
        .pipeline
        .manager()
        .definition(&sensor_id)
        .await
        .map(Json)
        .ok_or(ApiError::SensorNotFound(sensor_id))
}

/// `GET /api/sensors/{sensor_id}/data?limit=`
///
/// Newest readings first.
pub async fn data(
    State(state): State<AppState>,
    Path(sensor_id): Path<String>,
    Query(query): Query<DataQuery>,
) -> Result<Json<Vec<Reading>>, ApiError> {
    if !(1..=MAX_LIMIT).contains(&query.limit) {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        )));
    }
    let manager = state.pipeline.manager();
    if manager.definition(&sensor_id).await.is_none() {
        return Err(ApiError::SensorNotFound(sensor_id));
    }
    let mut readings = manager.readings_for(&sensor_id).await?;
    readings.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    readings.truncate(query.limit);
    Ok(Json(readings))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::Value;

    use crate::testing::{get_json, started_state, unstarted_state};

    #[tokio::test]
    async fn should_list_provider_statuses() {
        let (state, _pipeline) = started_state().await;
        let (status, body) = get_json(state, "/api/sensors/status").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["source_id"], "hw");
        assert_eq!(body[0]["available"], false);
        assert_eq!(body[1]["source_id"], "mock");
        assert_eq!(body[1]["sensor_count"], 2);
    }

    #[tokio::test]
    async fn should_filter_definitions_by_source() {
        let (state, _pipeline) = started_state().await;

        let (_, all) = get_json(state.clone(), "/api/sensors/definitions").await;
        assert_eq!(all.as_array().unwrap().len(), 2);

        let (_, none) = get_json(state, "/api/sensors/definitions?source=hw").await;
        assert_eq!(none, Value::Array(vec![]));
    }

    #[tokio::test]
    async fn should_return_cached_data_by_source() {
        let (state, _pipeline) = started_state().await;
        let (status, body) = get_json(state, "/api/sensors/data/all").await;

        assert_eq!(status, StatusCode::OK);
        let readings = body["mock"].as_array().unwrap();
        assert_eq!(readings.len(), 2);
        assert!(readings.iter().all(|r| r["source_id"] == "mock"));
    }

    #[tokio::test]
    async fn should_report_unavailable_before_start() {
        let state = unstarted_state();
        let (status, body) = get_json(state, "/api/sensors/data/all").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"].as_str().is_some());
    }

    #[tokio::test]
    async fn should_return_single_definition() {
        let (state, _pipeline) = started_state().await;
        let (status, body) = get_json(state, "/api/sensors/cpu_temp").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sensor_id"], "cpu_temp");
        assert_eq!(body["source_id"], "mock");
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_sensor() {
        let (state, _pipeline) = started_state().await;

        let (status, _) = get_json(state.clone(), "/api/sensors/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = get_json(state, "/api/sensors/nope/data").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_return_latest_readings_for_sensor() {
        let (state, _pipeline) = started_state().await;
        let (status, body) = get_json(state, "/api/sensors/gpu_temp/data").await;

        assert_eq!(status, StatusCode::OK);
        let readings = body.as_array().unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0]["sensor_id"], "gpu_temp");
    }

    #[tokio::test]
    async fn should_list_sensors_as_alias_of_definitions() {
        let (state, _pipeline) = started_state().await;

        let (status, all) = get_json(state.clone(), "/api/sensors").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(all.as_array().unwrap().len(), 2);

        let (_, mock) = get_json(state.clone(), "/api/sensors/?source=mock").await;
        assert_eq!(mock.as_array().unwrap().len(), 2);

        let (_, none) = get_json(state, "/api/sensors?source=hw").await;
        assert_eq!(none, Value::Array(vec![]));
    }

    #[tokio::test]
    async fn should_bound_data_limit() {
        let (state, _pipeline) = started_state().await;

        let (status, body) = get_json(state.clone(), "/api/sensors/gpu_temp/data?limit=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (status, body) = get_json(state.clone(), "/api/sensors/gpu_temp/data?limit=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("limit"));

        let (status, _) = get_json(state, "/api/sensors/gpu_temp/data?limit=101").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
