//! Broadcast scheduler. Turns the reading cache into `sensor_data`
//! envelopes and fans them out on a fixed cadence.
//!
//! Ticks are skipped while nobody is connected, and a tick with no readings
//! sends nothing. Repeated tick failures slow the cadence down: after
//! `error_threshold` consecutive errors the interval doubles (up to
//! `max_interval`), and the next successful tick restores it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use sensorcast_domain::envelope::{BroadcastStats, Envelope, Message, SensorData};
use sensorcast_domain::error::SensorcastError;
use sensorcast_domain::time::{Timestamp, now};

use crate::ports::Transport;
use crate::registry::ConnectionRegistry;
use crate::sensor_manager::SensorManager;
use crate::task::BackgroundTask;

/// Tuning knobs for [`BroadcastScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerSettings {
    pub interval: Duration,
    pub max_interval: Duration,
    pub error_threshold: u32,
    pub shutdown_grace: Duration,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_interval: Duration::from_secs(30),
            error_threshold: 10,
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nobody is connected; the cache was not touched.
    NoConnections,
    /// The cache holds no readings; nothing was sent.
    NoReadings,
    /// One envelope was fanned out.
    Broadcast { sequence: u64, delivered: usize },
}

#[derive(Debug)]
struct Counters {
    interval: Duration,
    broadcasts_sent: u64,
    errors_count: u64,
    consecutive_errors: u32,
    last_broadcast_time: Option<Timestamp>,
}

/// Periodic and on-demand fan-out of sensor data.
pub struct BroadcastScheduler<T> {
    manager: Arc<SensorManager>,
    registry: Arc<ConnectionRegistry<T>>,
    settings: SchedulerSettings,
    sequence: AtomicU64,
    counters: Mutex<Counters>,
    running: AtomicBool,
    task: tokio::sync::Mutex<Option<BackgroundTask>>,
}

impl<T: Transport> BroadcastScheduler<T> {
    #[must_use]
    pub fn new(
        manager: Arc<SensorManager>,
        registry: Arc<ConnectionRegistry<T>>,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            manager,
            registry,
            settings,
            sequence: AtomicU64::new(0),
            counters: Mutex::new(Counters {
                interval: settings.interval,
                broadcasts_sent: 0,
                errors_count: 0,
                consecutive_errors: 0,
                last_broadcast_time: None,
            }),
            running: AtomicBool::new(false),
            task: tokio::sync::Mutex::new(None),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<ConnectionRegistry<T>> {
        &self.registry
    }

    #[must_use]
    pub fn manager(&self) -> &Arc<SensorManager> {
        &self.manager
    }

    /// Start the periodic loop. Does nothing if it is already running.
    pub async fn start(self: &Arc<Self>) {
        let mut task = self.task.lock().await;
        if task.is_some() {
            return;
        }
        let scheduler = Arc::clone(self);
        *task = Some(BackgroundTask::spawn("broadcast-scheduler", |token| {
            scheduler.run(token)
        }));
        self.running.store(true, Ordering::Release);
        tracing::info!(interval = ?self.settings.interval, "broadcast scheduler started");
    }

    /// Stop the periodic loop, waiting up to the shutdown grace.
    pub async fn stop(&self) {
        let Some(task) = self.task.lock().await.take() else {
            return;
        };
        self.running.store(false, Ordering::Release);
        task.stop(self.settings.shutdown_grace).await;
        tracing::info!("broadcast scheduler stopped");
    }

    /// Run one scheduled broadcast.
    ///
    /// # Errors
    ///
    /// Propagates [`SensorcastError::NotInitialized`] when the manager is
    /// not running.
    pub async fn tick(&self) -> Result<TickOutcome, SensorcastError> {
        if self.registry.is_empty() {
            return Ok(TickOutcome::NoConnections);
        }
        let Some(envelope) = self.assemble(false).await? else {
            return Ok(TickOutcome::NoReadings);
        };
        Ok(self.fan_out(envelope).await)
    }

    /// Broadcast immediately with `forced = true`.
    ///
    /// Returns `false` without side effects when nobody is connected or
    /// there is nothing to send; `true` after exactly one fan-out.
    pub async fn force_broadcast(&self) -> bool {
        if self.registry.is_empty() {
            return false;
        }
        match self.assemble(true).await {
            Ok(Some(envelope)) => {
                self.fan_out(envelope).await;
                true
            }
            Ok(None) => false,
            Err(err) => {
                tracing::warn!(error = %err, "forced broadcast failed");
                false
            }
        }
    }

    /// Current statistics, including per-connection metadata.
    #[must_use]
    pub fn stats(&self) -> BroadcastStats {
        let counters = self.counters();
        BroadcastStats {
            is_running: self.running.load(Ordering::Acquire),
            broadcast_interval_seconds: counters.interval.as_secs_f64(),
            broadcasts_sent: counters.broadcasts_sent,
            last_broadcast_time: counters.last_broadcast_time,
            errors_count: counters.errors_count,
            connected_clients: self.registry.len(),
            connections: self.registry.connections(),
        }
    }

    async fn run(self: Arc<Self>, token: CancellationToken) {
        loop {
            let wait = self.counters().interval;
            tokio::select! {
                biased;
                () = token.cancelled() => break,
                () = tokio::time::sleep(wait) => {}
            }

            match self.tick().await {
                Ok(outcome) => {
                    tracing::trace!(?outcome, "broadcast tick");
                    self.record_success();
                }
                Err(err) => self.record_error(&err),
            }
        }
    }

    /// Build the `sensor_data` envelope, or `None` if there are no readings.
    async fn assemble(&self, forced: bool) -> Result<Option<Arc<Envelope>>, SensorcastError> {
        let sources = self.manager.get_all_data().await?;
        let timestamp = now();
        let data = SensorData::new(sources, timestamp, forced);
        if data.total_sensors == 0 {
            return Ok(None);
        }
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let envelope = Envelope::at(Message::SensorData(data), timestamp).with_sequence(sequence);
        Ok(Some(Arc::new(envelope)))
    }

    async fn fan_out(&self, envelope: Arc<Envelope>) -> TickOutcome {
        let sequence = envelope.sequence.unwrap_or_default();
        let delivered = self.registry.broadcast(envelope).await;
        {
            let mut counters = self.counters();
            counters.broadcasts_sent += 1;
            counters.last_broadcast_time = Some(now());
        }
        tracing::debug!(sequence, delivered, "sensor data broadcast");
        TickOutcome::Broadcast {
            sequence,
            delivered,
        }
    }

    fn record_success(&self) {
        let mut counters = self.counters();
        counters.consecutive_errors = 0;
        if counters.interval != self.settings.interval {
            tracing::info!(interval = ?self.settings.interval, "broadcast interval restored");
            counters.interval = self.settings.interval;
        }
    }

    fn record_error(&self, err: &SensorcastError) {
        let mut counters = self.counters();
        counters.errors_count += 1;
        counters.consecutive_errors += 1;
        tracing::warn!(
            error = %err,
            consecutive = counters.consecutive_errors,
            "broadcast tick failed"
        );
        if counters.consecutive_errors >= self.settings.error_threshold {
            counters.interval = counters.interval.saturating_mul(2).min(self.settings.max_interval);
            counters.consecutive_errors = 0;
            tracing::warn!(interval = ?counters.interval, "too many broadcast errors, slowing down");
        }
    }

    fn counters(&self) -> std::sync::MutexGuard<'_, Counters> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
