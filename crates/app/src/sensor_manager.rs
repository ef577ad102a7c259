//! Sensor manager: provider activation, periodic collection and the
//! reading cache.
//!
//! Providers are tried in priority order. Each successfully activated
//! provider contributes its definitions (first writer wins on `sensor_id`
//! collisions) and gets one cache slot keyed by `source_id`, which is
//! replaced wholesale on every successful read.
//!
//! A provider whose read fails or times out keeps its previous slot and is
//! retried after `poll_interval * 2^failures`, capped at `max_backoff`.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use sensorcast_domain::definition::Definition;
use sensorcast_domain::error::{ProviderError, SensorcastError};
use sensorcast_domain::provider::{ActivationPolicy, ProviderClass, ProviderStatus};
use sensorcast_domain::reading::Reading;

use crate::ports::{DynProvider, ProviderConfig};
use crate::task::BackgroundTask;

const MIN_PERIOD: Duration = Duration::from_millis(10);

/// Tuning knobs for [`SensorManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerSettings {
    pub poll_interval: Duration,
    pub read_timeout: Duration,
    pub max_backoff: Duration,
    pub activation_policy: ActivationPolicy,
    pub shutdown_grace: Duration,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            read_timeout: Duration::from_secs(5),
            max_backoff: Duration::from_secs(60),
            activation_policy: ActivationPolicy::default(),
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

/// Owns the providers and the merged, read-only view of their data.
pub struct SensorManager {
    inner: Arc<Inner>,
    lifecycle: Mutex<Lifecycle>,
}

enum Lifecycle {
    Idle(Vec<Box<dyn DynProvider>>),
    Running(BackgroundTask),
    Stopped,
}

struct Inner {
    settings: ManagerSettings,
    attempts: RwLock<Vec<Attempt>>,
    definitions: RwLock<DefinitionIndex>,
    cache: RwLock<HashMap<String, Vec<Reading>>>,
    backoff: Mutex<HashMap<String, Backoff>>,
    warmed: AtomicBool,
}

/// One provider the manager tried to activate, successfully or not.
struct Attempt {
    source_id: String,
    display_name: String,
    provider: Option<Arc<dyn DynProvider>>,
    sensor_count: usize,
}

#[derive(Debug, Clone, Copy)]
struct Backoff {
    failures: u32,
    next_attempt: Instant,
}

/// Definitions in activation order, indexed by `sensor_id`.
#[derive(Default)]
struct DefinitionIndex {
    ordered: Vec<Definition>,
    by_id: HashMap<String, usize>,
}

impl DefinitionIndex {
    /// Add `definitions`, keeping existing entries on id collisions.
    ///
    /// Returns how many incoming definitions were shadowed.
    fn merge(&mut self, definitions: Vec<Definition>) -> usize {
        let mut shadowed = 0;
        for definition in definitions {
            if self.by_id.contains_key(&definition.sensor_id) {
                shadowed += 1;
                continue;
            }
            self.by_id
                .insert(definition.sensor_id.clone(), self.ordered.len());
            self.ordered.push(definition);
        }
        shadowed
    }

    fn get(&self, sensor_id: &str) -> Option<&Definition> {
        self.by_id.get(sensor_id).map(|&idx| &self.ordered[idx])
    }
}

impl SensorManager {
    /// Create a manager over `providers`, highest priority first.
    ///
    /// Nothing is activated until [`initialize`](Self::initialize).
    #[must_use]
    pub fn new(providers: Vec<Box<dyn DynProvider>>, settings: ManagerSettings) -> Self {
        Self {
            inner: Arc::new(Inner {
                settings,
                attempts: RwLock::new(Vec::new()),
                definitions: RwLock::new(DefinitionIndex::default()),
                cache: RwLock::new(HashMap::new()),
                backoff: Mutex::new(HashMap::new()),
                warmed: AtomicBool::new(false),
            }),
            lifecycle: Mutex::new(Lifecycle::Idle(providers)),
        }
    }

    /// Activate providers with fallback semantics and start collecting.
    ///
    /// # Errors
    ///
    /// - [`SensorcastError::AlreadyInitialized`] if called more than once
    /// - [`SensorcastError::NoProvidersAvailable`] if every provider failed
    pub async fn initialize(&self) -> Result<(), SensorcastError> {
        let mut lifecycle = self.lifecycle.lock().await;
        let providers = match std::mem::replace(&mut *lifecycle, Lifecycle::Stopped) {
            Lifecycle::Idle(providers) => providers,
            other => {
                *lifecycle = other;
                return Err(SensorcastError::AlreadyInitialized);
            }
        };

        self.inner.activate(providers).await?;

        let inner = Arc::clone(&self.inner);
        *lifecycle = Lifecycle::Running(BackgroundTask::spawn("sensor-collector", |token| {
            inner.run(token)
        }));
        Ok(())
    }

    /// Whether the collection loop is running.
    pub async fn is_running(&self) -> bool {
        matches!(*self.lifecycle.lock().await, Lifecycle::Running(_))
    }

    /// Source ids of the active providers, in activation order.
    pub async fn active_sources(&self) -> Vec<String> {
        self.inner
            .attempts
            .read()
            .await
            .iter()
            .filter(|attempt| attempt.provider.is_some())
            .map(|attempt| attempt.source_id.clone())
            .collect()
    }

    /// Latest readings of every active provider, keyed by `source_id`.
    ///
    /// If no collection pass has completed yet, one is performed first so
    /// the very first caller never sees an empty cache.
    ///
    /// # Errors
    ///
    /// Returns [`SensorcastError::NotInitialized`] before a successful
    /// [`initialize`](Self::initialize) or after [`shutdown`](Self::shutdown).
    pub async fn get_all_data(&self) -> Result<BTreeMap<String, Vec<Reading>>, SensorcastError> {
        self.ensure_running().await?;
        self.inner.warm().await;
        let cache = self.inner.cache.read().await;
        Ok(cache
            .iter()
            .map(|(source_id, readings)| (source_id.clone(), readings.clone()))
            .collect())
    }

    /// Latest readings for `sensor_id`, across every source that reports it.
    ///
    /// # Errors
    ///
    /// Same as [`get_all_data`](Self::get_all_data).
    pub async fn readings_for(&self, sensor_id: &str) -> Result<Vec<Reading>, SensorcastError> {
        Ok(self
            .get_all_data()
            .await?
            .into_values()
            .flatten()
            .filter(|reading| reading.sensor_id == sensor_id)
            .collect())
    }

    /// Every merged definition, in activation order.
    pub async fn list_definitions(&self) -> Vec<Definition> {
        self.inner.definitions.read().await.ordered.clone()
    }

    /// Look up one definition by id.
    pub async fn definition(&self, sensor_id: &str) -> Option<Definition> {
        self.inner.definitions.read().await.get(sensor_id).cloned()
    }

    /// Definitions contributed by one provider.
    pub async fn definitions_for_source(&self, source_id: &str) -> Vec<Definition> {
        self.inner
            .definitions
            .read()
            .await
            .ordered
            .iter()
            .filter(|def| def.source_id == source_id)
            .cloned()
            .collect()
    }

    /// Status of every attempted provider, including the ones that failed
    /// to activate.
    pub async fn provider_statuses(&self) -> Vec<ProviderStatus> {
        let snapshot: Vec<_> = self
            .inner
            .attempts
            .read()
            .await
            .iter()
            .map(|attempt| {
                (
                    attempt.source_id.clone(),
                    attempt.display_name.clone(),
                    attempt.provider.clone(),
                    attempt.sensor_count,
                )
            })
            .collect();

        let mut statuses = Vec::with_capacity(snapshot.len());
        for (source_id, display_name, provider, sensor_count) in snapshot {
            let available = match provider {
                Some(provider) => provider.is_available().await,
                None => false,
            };
            statuses.push(ProviderStatus {
                source_id,
                display_name,
                available,
                sensor_count: if available { sensor_count } else { 0 },
            });
        }
        statuses
    }

    /// Stop collecting, close providers in activation order and clear all
    /// state. Safe to call more than once.
    pub async fn shutdown(&self) {
        let previous = std::mem::replace(&mut *self.lifecycle.lock().await, Lifecycle::Stopped);
        let was_running = matches!(previous, Lifecycle::Running(_));
        if let Lifecycle::Running(task) = previous {
            task.stop(self.inner.settings.shutdown_grace).await;
        }

        let attempts = std::mem::take(&mut *self.inner.attempts.write().await);
        for provider in attempts.into_iter().filter_map(|attempt| attempt.provider) {
            provider.close().await;
            tracing::debug!(source_id = %provider.source_id(), "provider closed");
        }

        *self.inner.definitions.write().await = DefinitionIndex::default();
        self.inner.cache.write().await.clear();
        self.inner.backoff.lock().await.clear();
        self.inner.warmed.store(false, Ordering::Release);

        if was_running {
            tracing::info!("sensor manager stopped");
        }
    }

    async fn ensure_running(&self) -> Result<(), SensorcastError> {
        if self.is_running().await {
            Ok(())
        } else {
            Err(SensorcastError::NotInitialized)
        }
    }
}

impl Inner {
    async fn activate(&self, providers: Vec<Box<dyn DynProvider>>) -> Result<(), SensorcastError> {
        let config = ProviderConfig {
            poll_interval: self.settings.poll_interval,
            read_timeout: self.settings.read_timeout,
        };
        let mut attempts = Vec::with_capacity(providers.len());
        let mut index = DefinitionIndex::default();

        for mut provider in providers {
            let source_id = provider.source_id().to_string();
            let display_name = provider.display_name().to_string();

            let ready = provider.initialize(&config).await && provider.is_available().await;
            if !ready {
                tracing::warn!(source_id = %source_id, "provider unavailable, falling back");
                provider.close().await;
                attempts.push(Attempt {
                    source_id,
                    display_name,
                    provider: None,
                    sensor_count: 0,
                });
                continue;
            }

            let definitions = provider.list_definitions();
            let sensor_count = definitions.len();
            let shadowed = index.merge(definitions);
            if shadowed > 0 {
                tracing::warn!(
                    source_id = %source_id,
                    count = shadowed,
                    "sensor ids already defined by a higher-priority provider were ignored"
                );
            }

            let class = provider.class();
            tracing::info!(source_id = %source_id, sensors = sensor_count, ?class, "provider activated");
            attempts.push(Attempt {
                source_id,
                display_name,
                provider: Some(Arc::from(provider)),
                sensor_count,
            });

            if self.settings.activation_policy == ActivationPolicy::FirstHardware
                && class == ProviderClass::Hardware
            {
                break;
            }
        }

        if attempts.iter().all(|attempt| attempt.provider.is_none()) {
            return Err(SensorcastError::NoProvidersAvailable {
                attempted: attempts.into_iter().map(|attempt| attempt.source_id).collect(),
            });
        }

        {
            let mut cache = self.cache.write().await;
            for attempt in attempts.iter().filter(|attempt| attempt.provider.is_some()) {
                cache.insert(attempt.source_id.clone(), Vec::new());
            }
        }
        *self.attempts.write().await = attempts;
        *self.definitions.write().await = index;
        Ok(())
    }

    async fn run(self: Arc<Self>, token: CancellationToken) {
        let mut ticker = tokio::time::interval(self.settings.poll_interval.max(MIN_PERIOD));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = token.cancelled() => break,
                _ = ticker.tick() => {}
            }
            tokio::select! {
                biased;
                () = token.cancelled() => break,
                () = self.collect() => {}
            }
        }
        tracing::debug!("collection loop exited");
    }

    /// Run one collection pass unless another caller already warmed the cache.
    async fn warm(&self) {
        if self.warmed.load(Ordering::Acquire) {
            return;
        }
        let mut backoff = self.backoff.lock().await;
        if !self.warmed.load(Ordering::Acquire) {
            tracing::debug!("cache cold, collecting eagerly");
            self.collect_locked(&mut backoff).await;
        }
    }

    async fn collect(&self) {
        let mut backoff = self.backoff.lock().await;
        self.collect_locked(&mut backoff).await;
    }

    async fn collect_locked(&self, backoff: &mut HashMap<String, Backoff>) {
        let providers: Vec<_> = self
            .attempts
            .read()
            .await
            .iter()
            .filter_map(|attempt| attempt.provider.clone())
            .collect();

        for provider in providers {
            let source_id = provider.source_id();
            if backoff
                .get(source_id)
                .is_some_and(|state| state.next_attempt > Instant::now())
            {
                continue;
            }
            if !provider.is_available().await {
                tracing::debug!(source_id = %source_id, "provider unavailable, skipped");
                continue;
            }

            match self.read(provider.as_ref()).await {
                Ok(readings) => {
                    if backoff.remove(source_id).is_some() {
                        tracing::info!(source_id = %source_id, "provider recovered");
                    }
                    tracing::trace!(source_id = %source_id, count = readings.len(), "readings collected");
                    self.cache
                        .write()
                        .await
                        .insert(source_id.to_string(), readings);
                }
                Err(err) => {
                    let failures = backoff
                        .get(source_id)
                        .map_or(1, |state| state.failures.saturating_add(1));
                    let delay = self.retry_delay(failures);
                    backoff.insert(
                        source_id.to_string(),
                        Backoff {
                            failures,
                            next_attempt: Instant::now() + delay,
                        },
                    );
                    tracing::warn!(
                        source_id = %source_id,
                        failures,
                        retry_in = ?delay,
                        error = %err,
                        "provider read failed"
                    );
                }
            }
        }

        self.warmed.store(true, Ordering::Release);
    }

    async fn read(&self, provider: &dyn DynProvider) -> Result<Vec<Reading>, ProviderError> {
        let timeout = self.settings.read_timeout;
        tokio::time::timeout(timeout, provider.read_all())
            .await
            .unwrap_or_else(|_| {
                Err(ProviderError::Timeout {
                    source_id: provider.source_id().to_string(),
                    timeout,
                })
            })
    }

    fn retry_delay(&self, failures: u32) -> Duration {
        self.settings
            .poll_interval
            .saturating_mul(2u32.saturating_pow(failures))
            .min(self.settings.max_backoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubProvider;

    fn boxed(provider: StubProvider) -> Box<dyn DynProvider> {
        Box::new(provider)
    }

    fn settings(policy: ActivationPolicy) -> ManagerSettings {
        ManagerSettings {
            activation_policy: policy,
            ..ManagerSettings::default()
        }
    }

    #[tokio::test]
    async fn should_fall_back_to_mock_when_hardware_fails() {
        let hw = StubProvider::hardware("hw", &["cpu_temp"]).failing_init();
        let hw_control = hw.control();
        let mock = StubProvider::fallback("mock", &["cpu_temp", "gpu_temp"]);
        let manager = SensorManager::new(
            vec![boxed(hw), boxed(mock)],
            ManagerSettings::default(),
        );

        manager.initialize().await.unwrap();

        assert_eq!(manager.active_sources().await, vec!["mock".to_string()]);
        assert!(hw_control.is_closed());

        let data = manager.get_all_data().await.unwrap();
        let readings = &data["mock"];
        assert_eq!(readings.len(), 2);
        assert!(readings.iter().all(|r| r.source_id == "mock"));

        let statuses = manager.provider_statuses().await;
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].source_id, "hw");
        assert!(!statuses[0].available);
        assert_eq!(statuses[0].sensor_count, 0);
        assert!(statuses[1].available);
        assert_eq!(statuses[1].sensor_count, 2);

        manager.shutdown().await;
    }

    #[tokio::test]
    async fn should_stop_at_first_hardware_provider() {
        let hw = StubProvider::hardware("hw", &["cpu_temp"]);
        let mock = StubProvider::fallback("mock", &["gpu_temp"]);
        let mock_control = mock.control();
        let manager = SensorManager::new(
            vec![boxed(hw), boxed(mock)],
            settings(ActivationPolicy::FirstHardware),
        );

        manager.initialize().await.unwrap();

        assert_eq!(manager.active_sources().await, vec!["hw".to_string()]);
        assert_eq!(manager.provider_statuses().await.len(), 1);
        assert_eq!(mock_control.reads(), 0);
        manager.shutdown().await;
    }

    #[tokio::test]
    async fn should_activate_every_provider_under_all_available() {
        let hw = StubProvider::hardware("hw", &["cpu_temp"]);
        let mock = StubProvider::fallback("mock", &["gpu_temp"]);
        let manager = SensorManager::new(
            vec![boxed(hw), boxed(mock)],
            settings(ActivationPolicy::AllAvailable),
        );

        manager.initialize().await.unwrap();

        assert_eq!(
            manager.active_sources().await,
            vec!["hw".to_string(), "mock".to_string()]
        );
        let data = manager.get_all_data().await.unwrap();
        assert_eq!(data.len(), 2);
        manager.shutdown().await;
    }

    #[tokio::test]
    async fn should_fail_when_no_provider_activates() {
        let a = StubProvider::hardware("a", &["x"]).failing_init();
        let b = StubProvider::fallback("b", &["y"]).failing_init();
        let b_control = b.control();
        let manager = SensorManager::new(vec![boxed(a), boxed(b)], ManagerSettings::default());

        let err = manager.initialize().await.unwrap_err();

        match err {
            SensorcastError::NoProvidersAvailable { attempted } => {
                assert_eq!(attempted, vec!["a".to_string(), "b".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(b_control.is_closed());
        assert!(!manager.is_running().await);
    }

    #[tokio::test]
    async fn should_reject_second_initialize() {
        let manager = SensorManager::new(
            vec![boxed(StubProvider::fallback("mock", &["a"]))],
            ManagerSettings::default(),
        );
        manager.initialize().await.unwrap();

        assert!(matches!(
            manager.initialize().await,
            Err(SensorcastError::AlreadyInitialized)
        ));
        manager.shutdown().await;
    }

    #[tokio::test]
    async fn should_keep_earlier_definition_on_collision() {
        let hw = StubProvider::hardware("hw", &["cpu_temp", "hw_only"]);
        let mock = StubProvider::fallback("mock", &["cpu_temp", "mock_only"]);
        let manager = SensorManager::new(
            vec![boxed(hw), boxed(mock)],
            settings(ActivationPolicy::AllAvailable),
        );
        manager.initialize().await.unwrap();

        let winner = manager.definition("cpu_temp").await.unwrap();
        assert_eq!(winner.source_id, "hw");

        let ids: Vec<_> = manager
            .list_definitions()
            .await
            .into_iter()
            .map(|def| def.sensor_id)
            .collect();
        assert_eq!(ids, vec!["cpu_temp", "hw_only", "mock_only"]);

        let mock_defs = manager.definitions_for_source("mock").await;
        assert_eq!(mock_defs.len(), 1);
        assert_eq!(mock_defs[0].sensor_id, "mock_only");
        assert!(manager.definition("missing").await.is_none());
        manager.shutdown().await;
    }

    #[tokio::test]
    async fn should_replace_cache_slot_wholesale() {
        let mock = StubProvider::fallback("mock", &["a", "b"]);
        let control = mock.control();
        let manager = SensorManager::new(Vec::new(), ManagerSettings::default());
        manager.inner.activate(vec![boxed(mock)]).await.unwrap();

        manager.inner.collect().await;
        assert_eq!(manager.inner.cache.read().await["mock"].len(), 2);

        control.set_sensors(&["c"]);
        manager.inner.collect().await;

        let cache = manager.inner.cache.read().await;
        let ids: Vec<_> = cache["mock"].iter().map(|r| r.sensor_id.as_str()).collect();
        assert_eq!(ids, vec!["c"]);
    }

    #[tokio::test]
    async fn should_warm_cache_on_first_read() {
        let mock = StubProvider::fallback("mock", &["a"]);
        let control = mock.control();
        let manager = SensorManager::new(Vec::new(), ManagerSettings::default());
        manager.inner.activate(vec![boxed(mock)]).await.unwrap();
        // Collector that never ticks, so only the eager pass can fill the cache.
        *manager.lifecycle.lock().await = Lifecycle::Running(BackgroundTask::spawn(
            "idle",
            |token| async move { token.cancelled().await },
        ));

        let data = manager.get_all_data().await.unwrap();
        assert_eq!(control.reads(), 1);
        assert_eq!(data["mock"].len(), 1);

        manager.get_all_data().await.unwrap();
        assert_eq!(control.reads(), 1);
        manager.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn should_back_off_exponentially_and_reset_on_success() {
        let mock = StubProvider::fallback("mock", &["a"]);
        let control = mock.control();
        let manager = SensorManager::new(Vec::new(), ManagerSettings::default());
        manager.inner.activate(vec![boxed(mock)]).await.unwrap();
        control.fail_reads.store(true, Ordering::SeqCst);
        let tick = Duration::from_secs(2);

        // t=0: first failure, retry in 4s
        manager.inner.collect().await;
        assert_eq!(control.reads(), 1);

        tokio::time::advance(tick).await;
        manager.inner.collect().await;
        assert_eq!(control.reads(), 1);

        // t=4: second failure, retry in 8s
        tokio::time::advance(tick).await;
        manager.inner.collect().await;
        assert_eq!(control.reads(), 2);

        for _ in 0..3 {
            tokio::time::advance(tick).await;
            manager.inner.collect().await;
        }
        assert_eq!(control.reads(), 2);

        // t=12: succeeds, back to every tick
        control.fail_reads.store(false, Ordering::SeqCst);
        tokio::time::advance(tick).await;
        manager.inner.collect().await;
        assert_eq!(control.reads(), 3);

        tokio::time::advance(tick).await;
        manager.inner.collect().await;
        assert_eq!(control.reads(), 4);
        assert!(manager.inner.backoff.lock().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn should_keep_previous_slot_when_read_times_out() {
        let mock = StubProvider::fallback("mock", &["a"]).slow_reads(Duration::from_secs(30));
        let manager = SensorManager::new(
            Vec::new(),
            ManagerSettings {
                read_timeout: Duration::from_secs(1),
                ..ManagerSettings::default()
            },
        );
        manager.inner.activate(vec![boxed(mock)]).await.unwrap();

        manager.inner.collect().await;

        assert!(manager.inner.cache.read().await["mock"].is_empty());
        assert_eq!(manager.inner.backoff.lock().await["mock"].failures, 1);
    }

    #[test]
    fn should_cap_retry_delay() {
        let manager = SensorManager::new(Vec::new(), ManagerSettings::default());
        assert_eq!(manager.inner.retry_delay(1), Duration::from_secs(4));
        assert_eq!(manager.inner.retry_delay(3), Duration::from_secs(16));
        assert_eq!(manager.inner.retry_delay(10), Duration::from_secs(60));
        assert_eq!(manager.inner.retry_delay(u32::MAX), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn should_close_providers_and_clear_state_on_shutdown() {
        let hw = StubProvider::hardware("hw", &["a"]);
        let hw_control = hw.control();
        let mock = StubProvider::fallback("mock", &["b"]);
        let mock_control = mock.control();
        let manager = SensorManager::new(
            vec![boxed(hw), boxed(mock)],
            settings(ActivationPolicy::AllAvailable),
        );
        manager.initialize().await.unwrap();

        manager.shutdown().await;

        assert!(hw_control.is_closed());
        assert!(mock_control.is_closed());
        assert!(manager.list_definitions().await.is_empty());
        assert!(manager.provider_statuses().await.is_empty());
        assert!(matches!(
            manager.get_all_data().await,
            Err(SensorcastError::NotInitialized)
        ));

        manager.shutdown().await;
    }

    #[tokio::test]
    async fn should_report_not_initialized_before_initialize() {
        let manager = SensorManager::new(
            vec![boxed(StubProvider::fallback("mock", &["a"]))],
            ManagerSettings::default(),
        );
        assert!(matches!(
            manager.get_all_data().await,
            Err(SensorcastError::NotInitialized)
        ));
    }

    #[tokio::test]
    async fn should_filter_readings_by_sensor_id() {
        let manager = SensorManager::new(
            vec![boxed(StubProvider::fallback("mock", &["a", "b"]))],
            ManagerSettings::default(),
        );
        manager.initialize().await.unwrap();

        let readings = manager.readings_for("b").await.unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].sensor_id, "b");
        assert!(manager.readings_for("zzz").await.unwrap().is_empty());
        manager.shutdown().await;
    }
}
