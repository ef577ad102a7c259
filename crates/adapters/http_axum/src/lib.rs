//! # sensorcast-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **JSON API** over the sensor manager and the broadcast
//!   scheduler (`/api/sensors/...`, `/api/realtime/...`)
//! - Serve the **real-time stream** at `/ws`: each socket becomes one
//!   registry connection whose outbound queue is drained by a writer task
//! - Map application errors into HTTP status codes
//!
//! ## Dependency rule
//! Depends on `sensorcast-app` (pipeline, session loop, channel transport)
//! and `sensorcast-domain` (types used in responses). Never leaks axum
//! types into the application layer.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
pub mod ws;

#[cfg(test)]
pub(crate) mod testing;
