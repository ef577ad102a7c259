//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use sensorcast_domain::error::SensorcastError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Errors an API handler can return.
#[derive(Debug)]
pub enum ApiError {
    /// Failure reported by the pipeline.
    Pipeline(SensorcastError),
    /// No definition exists for the requested sensor id.
    SensorNotFound(String),
    /// A query parameter is out of range.
    BadRequest(String),
}

impl From<SensorcastError> for ApiError {
    fn from(err: SensorcastError) -> Self {
        Self::Pipeline(err)
    }
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::SensorNotFound(id) => (StatusCode::NOT_FOUND, format!("sensor {id} not found")),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            Self::Pipeline(err) => match err {
                SensorcastError::NotInitialized
                | SensorcastError::NoProvidersAvailable { .. }
                | SensorcastError::CapacityReached { .. }
                | SensorcastError::ConnectionLost => {
                    (StatusCode::SERVICE_UNAVAILABLE, err.to_string())
                }
                SensorcastError::AlreadyInitialized => (StatusCode::CONFLICT, err.to_string()),
                SensorcastError::Validation(inner) => (StatusCode::BAD_REQUEST, inner.to_string()),
                SensorcastError::Provider(inner) => {
                    tracing::error!(error = %inner, "provider error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal server error".to_string(),
                    )
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
