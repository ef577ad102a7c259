//! Shared fixtures for handler tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt as _;
use serde_json::Value;
use tower::ServiceExt as _;

use sensorcast_app::channel::ChannelTransport;
use sensorcast_app::pipeline::{Pipeline, PipelineSettings};
use sensorcast_app::ports::{DynProvider, Provider, ProviderConfig};
use sensorcast_domain::definition::Definition;
use sensorcast_domain::error::ProviderError;
use sensorcast_domain::provider::ProviderClass;
use sensorcast_domain::reading::{HardwareType, Reading, SensorCategory};
use sensorcast_domain::time::now;

use crate::state::AppState;

pub(crate) struct StubProvider {
    source_id: &'static str,
    class: ProviderClass,
    sensors: &'static [&'static str],
}

impl StubProvider {
    fn definition(&self, sensor_id: &str) -> Definition {
        Definition {
            sensor_id: sensor_id.to_string(),
            name: sensor_id.to_string(),
            unit: "\u{b0}C".to_string(),
            category: SensorCategory::Temperature,
            hardware_type: HardwareType::Cpu,
            source_id: self.source_id.to_string(),
            min: None,
            max: None,
        }
    }
}

impl Provider for StubProvider {
    fn source_id(&self) -> &str {
        self.source_id
    }

    fn display_name(&self) -> &str {
        self.source_id
    }

    fn class(&self) -> ProviderClass {
        self.class
    }

    async fn initialize(&mut self, _config: &ProviderConfig) -> bool {
        self.class == ProviderClass::Fallback
    }

    async fn close(&self) {}

    async fn is_available(&self) -> bool {
        self.class == ProviderClass::Fallback
    }

    fn list_definitions(&self) -> Vec<Definition> {
        self.sensors.iter().map(|id| self.definition(id)).collect()
    }

    async fn read_all(&self) -> Result<Vec<Reading>, ProviderError> {
        let timestamp = now();
        Ok(self
            .sensors
            .iter()
            .map(|id| Reading::sample(&self.definition(id), 42.0, timestamp))
            .collect())
    }
}

fn pipeline() -> Arc<Pipeline<ChannelTransport>> {
    let providers: Vec<Box<dyn DynProvider>> = vec![
        Box::new(StubProvider {
            source_id: "hw",
            class: ProviderClass::Hardware,
            sensors: &["cpu_temp"],
        }),
        Box::new(StubProvider {
            source_id: "mock",
            class: ProviderClass::Fallback,
            sensors: &["cpu_temp", "gpu_temp"],
        }),
    ];
    Arc::new(Pipeline::new(providers, PipelineSettings::default()))
}

/// State over a pipeline whose hardware stub failed and mock stub is active.
pub(crate) async fn started_state() -> (AppState, Arc<Pipeline<ChannelTransport>>) {
    let pipeline = pipeline();
    pipeline.start().await.unwrap();
    (AppState::new(Arc::clone(&pipeline)), pipeline)
}

pub(crate) fn unstarted_state() -> AppState {
    AppState::new(pipeline())
}

async fn call(state: AppState, method: Method, uri: &str) -> (StatusCode, Value) {
    let response = crate::router::build(state)
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub(crate) async fn get_json(state: AppState, uri: &str) -> (StatusCode, Value) {
    call(state, Method::GET, uri).await
}

pub(crate) async fn post_json(state: AppState, uri: &str) -> (StatusCode, Value) {
    call(state, Method::POST, uri).await
}
