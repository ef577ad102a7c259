//! # sensorcast-adapter-sysinfo
//!
//! Host hardware provider built on [sysinfo](https://docs.rs/sysinfo).
//!
//! ## Sensors
//! - total and per-core CPU load, average CPU clock
//! - memory and swap usage as a percentage
//! - every temperature component the kernel exposes
//!
//! The set is fixed at [`initialize`](Provider::initialize); components that
//! appear later are ignored until the provider is recreated.
//!
//! `sysinfo` calls are blocking, so discovery and every read run on tokio's
//! blocking pool.
//!
//! ## Dependency rule
//! Depends on `sensorcast-app` (port traits) and `sensorcast-domain` only.

pub mod error;
mod probe;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use sensorcast_app::ports::{Provider, ProviderConfig};
use sensorcast_domain::definition::Definition;
use sensorcast_domain::error::ProviderError;
use sensorcast_domain::provider::ProviderClass;
use sensorcast_domain::reading::Reading;
use sensorcast_domain::time::now;

use crate::error::HostError;
use crate::probe::{HostSensor, Probe};

/// Source id tagging every host reading.
pub const SOURCE_ID: &str = "host";

struct Discovered {
    probe: Arc<Mutex<Probe>>,
    sensors: Arc<[HostSensor]>,
}

/// Provider reading the machine it runs on.
#[derive(Default)]
pub struct HostProvider {
    discovered: Option<Discovered>,
    available: AtomicBool,
}

impl HostProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn discover() -> Result<Discovered, HostError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(HostError::Unsupported);
        }
        let (probe, sensors) = tokio::task::spawn_blocking(|| {
            let probe = Probe::new();
            let sensors = probe.discover();
            (probe, sensors)
        })
        .await?;
        if sensors.is_empty() {
            return Err(HostError::NoSensors);
        }
        Ok(Discovered {
            probe: Arc::new(Mutex::new(probe)),
            sensors: sensors.into(),
        })
    }

    async fn sample(discovered: &Discovered) -> Result<Vec<Reading>, HostError> {
        let probe = Arc::clone(&discovered.probe);
        let sensors = Arc::clone(&discovered.sensors);
        let values = tokio::task::spawn_blocking(move || {
            probe
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .sample(&sensors)
        })
        .await?;

        let timestamp = now();
        Ok(values
            .into_iter()
            .map(|(index, value)| {
                let definition = &discovered.sensors[index].definition;
                Reading::sample(definition, definition.clamp(value), timestamp)
            })
            .collect())
    }
}

impl Provider for HostProvider {
    fn source_id(&self) -> &str {
        SOURCE_ID
    }

    fn display_name(&self) -> &str {
        "Host Hardware"
    }

    fn class(&self) -> ProviderClass {
        ProviderClass::Hardware
    }

    async fn initialize(&mut self, _config: &ProviderConfig) -> bool {
        match Self::discover().await {
            Ok(discovered) => {
                tracing::info!(sensors = discovered.sensors.len(), "host sensors discovered");
                self.discovered = Some(discovered);
                self.available.store(true, Ordering::Release);
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "host provider unavailable");
                self.available.store(false, Ordering::Release);
                false
            }
        }
    }

    async fn close(&self) {
        self.available.store(false, Ordering::Release);
        tracing::debug!("host provider closed");
    }

    async fn is_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }

    fn list_definitions(&self) -> Vec<Definition> {
        self.discovered
            .as_ref()
            .map(|d| d.sensors.iter().map(|s| s.definition.clone()).collect())
            .unwrap_or_default()
    }

    async fn read_all(&self) -> Result<Vec<Reading>, ProviderError> {
        let discovered = match &self.discovered {
            Some(discovered) if self.available.load(Ordering::Acquire) => discovered,
            _ => {
                return Err(ProviderError::Unavailable {
                    source_id: SOURCE_ID.to_string(),
                });
            }
        };
        Ok(Self::sample(discovered).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_identify_as_hardware() {
        let provider = HostProvider::new();
        assert_eq!(provider.source_id(), "host");
        assert_eq!(provider.class(), ProviderClass::Hardware);
    }

    #[tokio::test]
    async fn should_be_unavailable_before_initialize() {
        let provider = HostProvider::new();
        assert!(!provider.is_available().await);
        assert!(provider.list_definitions().is_empty());
        assert!(matches!(
            provider.read_all().await,
            Err(ProviderError::Unavailable { .. })
        ));
    }

    #[tokio::test]
    async fn should_read_discovered_sensors() {
        let mut provider = HostProvider::new();
        if !provider.initialize(&ProviderConfig::default()).await {
            assert!(!provider.is_available().await);
            return;
        }

        let definitions = provider.list_definitions();
        assert!(definitions.iter().any(|d| d.sensor_id == "cpu_load"));

        let readings = provider.read_all().await.unwrap();
        assert!(!readings.is_empty());
        for reading in &readings {
            assert_eq!(reading.source_id, "host");
            let definition = definitions
                .iter()
                .find(|d| d.sensor_id == reading.sensor_id)
                .unwrap();
            if let (Some(min), Some(max)) = (definition.min, definition.max) {
                assert!(reading.value >= min && reading.value <= max);
            }
        }
    }

    #[tokio::test]
    async fn should_refuse_reads_after_close() {
        let mut provider = HostProvider::new();
        if !provider.initialize(&ProviderConfig::default()).await {
            return;
        }
        provider.close().await;

        assert!(!provider.is_available().await);
        assert!(matches!(
            provider.read_all().await,
            Err(ProviderError::Unavailable { .. })
        ));
    }
}
