//! Stub providers and transports shared by the unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sensorcast_domain::definition::Definition;
use sensorcast_domain::envelope::Envelope;
use sensorcast_domain::error::ProviderError;
use sensorcast_domain::provider::ProviderClass;
use sensorcast_domain::reading::Reading;
use sensorcast_domain::time::now;

use crate::ports::{Provider, ProviderConfig, Transport, TransportError};

/// Knobs and counters shared between a [`StubProvider`] and the test body.
#[derive(Debug, Default)]
pub(crate) struct StubControl {
    pub(crate) closed: AtomicBool,
    pub(crate) fail_reads: AtomicBool,
    pub(crate) reads: AtomicUsize,
    pub(crate) sensors: Mutex<Vec<String>>,
}

impl StubControl {
    pub(crate) fn set_sensors(&self, sensors: &[&str]) {
        *self.sensors.lock().unwrap() = sensors.iter().map(ToString::to_string).collect();
    }

    pub(crate) fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

pub(crate) struct StubProvider {
    source_id: String,
    class: ProviderClass,
    init_ok: bool,
    read_delay: Option<Duration>,
    control: Arc<StubControl>,
}

impl StubProvider {
    pub(crate) fn hardware(source_id: &str, sensors: &[&str]) -> Self {
        Self::new(source_id, ProviderClass::Hardware, sensors)
    }

    pub(crate) fn fallback(source_id: &str, sensors: &[&str]) -> Self {
        Self::new(source_id, ProviderClass::Fallback, sensors)
    }

    fn new(source_id: &str, class: ProviderClass, sensors: &[&str]) -> Self {
        let control = Arc::new(StubControl::default());
        control.set_sensors(sensors);
        Self {
            source_id: source_id.to_string(),
            class,
            init_ok: true,
            read_delay: None,
            control,
        }
    }

    pub(crate) fn failing_init(mut self) -> Self {
        self.init_ok = false;
        self
    }

    pub(crate) fn slow_reads(mut self, delay: Duration) -> Self {
        self.read_delay = Some(delay);
        self
    }

    pub(crate) fn control(&self) -> Arc<StubControl> {
        Arc::clone(&self.control)
    }

    fn definition(&self, sensor_id: &str) -> Definition {
        Definition::builder()
            .sensor_id(sensor_id)
            .name(format!("{} {sensor_id}", self.source_id))
            .source_id(&self.source_id)
            .build()
            .unwrap()
    }
}

impl Provider for StubProvider {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    fn display_name(&self) -> &str {
        &self.source_id
    }

    fn class(&self) -> ProviderClass {
        self.class
    }

    async fn initialize(&mut self, _config: &ProviderConfig) -> bool {
        self.init_ok
    }

    async fn close(&self) {
        self.control.closed.store(true, Ordering::SeqCst);
    }

    async fn is_available(&self) -> bool {
        self.init_ok && !self.control.is_closed()
    }

    fn list_definitions(&self) -> Vec<Definition> {
        let sensors = self.control.sensors.lock().unwrap().clone();
        sensors.iter().map(|id| self.definition(id)).collect()
    }

    async fn read_all(&self) -> Result<Vec<Reading>, ProviderError> {
        let count = self.control.reads.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(delay) = self.read_delay {
            tokio::time::sleep(delay).await;
        }
        if self.control.fail_reads.load(Ordering::SeqCst) {
            return Err(ProviderError::Unavailable {
                source_id: self.source_id.clone(),
            });
        }
        #[allow(clippy::cast_precision_loss)]
        let value = count as f64;
        Ok(self
            .list_definitions()
            .iter()
            .map(|def| Reading::sample(def, value, now()))
            .collect())
    }
}

#[derive(Debug, Default)]
pub(crate) struct TransportLog {
    pub(crate) sent: Mutex<Vec<Arc<Envelope>>>,
    pub(crate) pings: AtomicUsize,
    pub(crate) closed: AtomicBool,
    pub(crate) fail: AtomicBool,
}

impl TransportLog {
    pub(crate) fn sent(&self) -> Vec<Arc<Envelope>> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn kinds(&self) -> Vec<&'static str> {
        self.sent().iter().map(|env| env.kind()).collect()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_sends(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

/// Transport that records everything it is asked to send.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingTransport {
    pub(crate) log: Arc<TransportLog>,
}

impl RecordingTransport {
    pub(crate) fn new() -> (Self, Arc<TransportLog>) {
        let transport = Self::default();
        let log = Arc::clone(&transport.log);
        (transport, log)
    }

    fn check(&self) -> Result<(), TransportError> {
        if self.log.fail.load(Ordering::SeqCst) || self.log.is_closed() {
            Err(TransportError::Closed)
        } else {
            Ok(())
        }
    }
}

impl Transport for RecordingTransport {
    async fn send(&self, envelope: Arc<Envelope>) -> Result<(), TransportError> {
        self.check()?;
        self.log.sent.lock().unwrap().push(envelope);
        Ok(())
    }

    async fn ping(&self) -> Result<(), TransportError> {
        self.check()?;
        self.log.pings.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) {
        self.log.closed.store(true, Ordering::SeqCst);
    }
}
