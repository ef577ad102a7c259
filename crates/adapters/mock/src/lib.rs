//! # sensorcast-adapter-mock
//!
//! Simulated sensor provider. It is always available, so placing it last
//! in the priority list guarantees the pipeline has at least one source.
//!
//! Every sensor drifts around its base value with a slow and a fast sine
//! wave plus a little random noise, clamped into its declared range:
//!
//! ```text
//! value = base + variation * (0.3 sin(0.1 t) + 0.1 sin(2 t) + 0.2 (noise - 0.5))
//! ```
//!
//! where `t` is minutes since activation and `noise` is uniform in `[0, 1)`.
//! RPM and MHz values are whole numbers; everything else has one decimal.
//!
//! ## Dependency rule
//!
//! Depends on `sensorcast-app` (port traits) and `sensorcast-domain` only.

mod catalog;

use std::time::Instant;

use rand::Rng as _;

use sensorcast_app::ports::{Provider, ProviderConfig};
use sensorcast_domain::definition::Definition;
use sensorcast_domain::error::ProviderError;
use sensorcast_domain::provider::ProviderClass;
use sensorcast_domain::reading::Reading;
use sensorcast_domain::time::now;

use catalog::{CATALOG, SimulatedSensor};

/// Source id tagging every simulated reading.
pub const SOURCE_ID: &str = "mock";

/// Provider producing plausible, smoothly varying fake readings.
pub struct MockProvider {
    started: Instant,
    definitions: Vec<Definition>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            started: Instant::now(),
            definitions: CATALOG.iter().map(SimulatedSensor::definition).collect(),
        }
    }
}

impl MockProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn sample_all(&self) -> Vec<Reading> {
        let minutes = self.started.elapsed().as_secs_f64() / 60.0;
        let timestamp = now();
        let mut rng = rand::rng();
        CATALOG
            .iter()
            .zip(&self.definitions)
            .map(|(sensor, definition)| {
                let value = simulate(sensor, minutes, rng.random::<f64>());
                Reading::sample(definition, value, timestamp)
            })
            .collect()
    }
}

impl Provider for MockProvider {
    fn source_id(&self) -> &str {
        SOURCE_ID
    }

    fn display_name(&self) -> &str {
        "Mock Sensor"
    }

    fn class(&self) -> ProviderClass {
        ProviderClass::Fallback
    }

    async fn initialize(&mut self, _config: &ProviderConfig) -> bool {
        self.started = Instant::now();
        tracing::info!(sensors = self.definitions.len(), "mock provider ready");
        true
    }

    async fn close(&self) {
        tracing::debug!("mock provider closed");
    }

    async fn is_available(&self) -> bool {
        true
    }

    fn list_definitions(&self) -> Vec<Definition> {
        self.definitions.clone()
    }

    async fn read_all(&self) -> Result<Vec<Reading>, ProviderError> {
        Ok(self.sample_all())
    }
}

/// Value of `sensor` at `minutes` since activation, given uniform `noise`.
fn simulate(sensor: &SimulatedSensor, minutes: f64, noise: f64) -> f64 {
    let wave = (minutes * 0.1).sin() * 0.3 + (minutes * 2.0).sin() * 0.1 + (noise - 0.5) * 0.2;
    let value = (sensor.base + sensor.variation * wave).clamp(sensor.min, sensor.max);
    if sensor.is_integral() {
        value.round()
    } else {
        (value * 10.0).round() / 10.0
    }
}
