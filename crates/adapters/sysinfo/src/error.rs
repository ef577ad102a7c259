//! Host adapter error types.

use sensorcast_domain::error::ProviderError;

use crate::SOURCE_ID;

/// Errors specific to the host adapter.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// `sysinfo` has no backend for this operating system.
    #[error("host sensors are not supported on this platform")]
    Unsupported,

    /// Discovery found nothing worth reporting.
    #[error("no host sensors discovered")]
    NoSensors,

    /// The blocking probe task panicked or was cancelled.
    #[error("host probe task failed")]
    Probe(#[from] tokio::task::JoinError),
}

impl From<HostError> for ProviderError {
    fn from(err: HostError) -> Self {
        match err {
            HostError::Unsupported | HostError::NoSensors => ProviderError::Unavailable {
                source_id: SOURCE_ID.to_string(),
            },
            HostError::Probe(_) => ProviderError::Read {
                source_id: SOURCE_ID.to_string(),
                source: Box::new(err),
            },
        }
    }
}
