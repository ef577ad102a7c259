//! Shared application state for axum handlers.

use std::sync::Arc;

use sensorcast_app::channel::ChannelTransport;
use sensorcast_app::pipeline::Pipeline;

/// Application state shared across all axum handlers.
///
/// `Clone` is implemented manually so the pipeline itself does not need to
/// be `Clone`; only the `Arc` is cloned.
pub struct AppState {
    /// The running pipeline. WebSocket connections are registered through
    /// channel transports.
    pub pipeline: Arc<Pipeline<ChannelTransport>>,
}

impl Clone for AppState {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
        }
    }
}

impl AppState {
    /// Wrap an already shared pipeline.
    ///
    /// The binary keeps its own handle to call
    /// [`Pipeline::shutdown`] once the server has drained.
    #[must_use]
    pub fn new(pipeline: Arc<Pipeline<ChannelTransport>>) -> Self {
        Self { pipeline }
    }
}
