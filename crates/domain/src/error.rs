//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`SensorcastError`] via `#[from]` when crossing a port boundary.

use std::time::Duration;

/// Boxed error type carried by adapter-specific failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error for the telemetry pipeline.
#[derive(Debug, thiserror::Error)]
pub enum SensorcastError {
    /// Every provider in the priority list failed to activate.
    #[error("no sensor provider could be activated (tried: {})", .attempted.join(", "))]
    NoProvidersAvailable {
        /// Source ids of the providers that were attempted, in order.
        attempted: Vec<String>,
    },

    /// `initialize` was called on a manager that is already running.
    #[error("sensor manager is already initialised")]
    AlreadyInitialized,

    /// The manager was queried before `initialize` succeeded.
    #[error("sensor manager is not initialised")]
    NotInitialized,

    /// The connection registry is full.
    #[error("connection limit of {max} reached")]
    CapacityReached {
        /// Configured maximum number of concurrent connections.
        max: usize,
    },

    /// The connection went away before its welcome could be delivered.
    #[error("connection closed during handshake")]
    ConnectionLost,

    /// A provider failed to produce data.
    #[error("provider error")]
    Provider(#[from] ProviderError),

    /// A domain value failed validation.
    #[error("validation error")]
    Validation(#[from] ValidationError),
}

/// Failures raised by a single provider while reading.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider reported itself as unavailable.
    #[error("provider {source_id} is unavailable")]
    Unavailable {
        /// Source id of the failing provider.
        source_id: String,
    },

    /// The provider did not answer within the configured read timeout.
    #[error("provider {source_id} did not answer within {timeout:?}")]
    Timeout {
        /// Source id of the failing provider.
        source_id: String,
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// The provider's backend returned an error.
    #[error("provider {source_id} failed to read")]
    Read {
        /// Source id of the failing provider.
        source_id: String,
        /// Underlying backend error.
        #[source]
        source: BoxError,
    },
}

impl ProviderError {
    /// Source id of the provider that raised this error.
    #[must_use]
    pub fn source_id(&self) -> &str {
        match self {
            Self::Unavailable { source_id }
            | Self::Timeout { source_id, .. }
            | Self::Read { source_id, .. } => source_id,
        }
    }
}

/// Invariant violations on domain values.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A sensor id was empty or whitespace.
    #[error("sensor id must not be empty")]
    EmptySensorId,

    /// A sensor name was empty or whitespace.
    #[error("sensor name must not be empty")]
    EmptyName,

    /// A source id was empty or whitespace.
    #[error("source id must not be empty")]
    EmptySourceId,

    /// The declared range has `min > max`.
    #[error("invalid range for sensor {sensor_id}: min is greater than max")]
    InvalidRange {
        /// The offending sensor.
        sensor_id: String,
    },
}
