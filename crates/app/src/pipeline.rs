//! Composition of manager, registry, scheduler and sweeper.
//!
//! The binary builds one [`Pipeline`], calls [`start`](Pipeline::start)
//! before serving traffic and [`shutdown`](Pipeline::shutdown) after the
//! server has drained.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use sensorcast_domain::error::SensorcastError;

use crate::ports::{DynProvider, Transport};
use crate::registry::ConnectionRegistry;
use crate::scheduler::{BroadcastScheduler, SchedulerSettings};
use crate::sensor_manager::{ManagerSettings, SensorManager};
use crate::session::SessionSettings;
use crate::task::BackgroundTask;

/// Every tunable of the pipeline in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    pub manager: ManagerSettings,
    pub scheduler: SchedulerSettings,
    pub session: SessionSettings,
    pub max_connections: usize,
    pub stale_timeout: Duration,
    pub sweep_interval: Duration,
    pub outbound_buffer: usize,
    pub shutdown_grace: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            manager: ManagerSettings::default(),
            scheduler: SchedulerSettings::default(),
            session: SessionSettings::default(),
            max_connections: 100,
            stale_timeout: Duration::from_secs(300),
            sweep_interval: Duration::from_secs(60),
            outbound_buffer: 32,
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

/// The running telemetry pipeline.
pub struct Pipeline<T> {
    manager: Arc<SensorManager>,
    registry: Arc<ConnectionRegistry<T>>,
    scheduler: Arc<BroadcastScheduler<T>>,
    sweeper: Mutex<Option<BackgroundTask>>,
    settings: PipelineSettings,
}

impl<T: Transport> Pipeline<T> {
    /// Wire the components together. Nothing runs until [`start`](Self::start).
    #[must_use]
    pub fn new(providers: Vec<Box<dyn DynProvider>>, settings: PipelineSettings) -> Self {
        let manager = Arc::new(SensorManager::new(providers, settings.manager));
        let registry = Arc::new(ConnectionRegistry::new(settings.max_connections));
        let scheduler = Arc::new(BroadcastScheduler::new(
            Arc::clone(&manager),
            Arc::clone(&registry),
            settings.scheduler,
        ));
        Self {
            manager,
            registry,
            scheduler,
            sweeper: Mutex::new(None),
            settings,
        }
    }

    /// Activate providers, then start broadcasting and sweeping.
    ///
    /// # Errors
    ///
    /// Propagates [`SensorcastError::NoProvidersAvailable`] and
    /// [`SensorcastError::AlreadyInitialized`] from the manager.
    pub async fn start(&self) -> Result<(), SensorcastError> {
        self.manager.initialize().await?;
        self.scheduler.start().await;

        let mut sweeper = self.sweeper.lock().await;
        if sweeper.is_none() {
            *sweeper = Some(
                self.registry
                    .spawn_sweeper(self.settings.sweep_interval, self.settings.stale_timeout),
            );
        }

        tracing::info!(
            sources = ?self.manager.active_sources().await,
            max_connections = self.settings.max_connections,
            "pipeline started"
        );
        Ok(())
    }

    /// Stop the scheduler, the sweeper, every connection and finally the
    /// manager. Safe to call more than once.
    pub async fn shutdown(&self) {
        self.scheduler.stop().await;
        let sweeper = self.sweeper.lock().await.take();
        if let Some(sweeper) = sweeper {
            sweeper.stop(self.settings.shutdown_grace).await;
        }
        self.registry.close_all().await;
        self.manager.shutdown().await;
        tracing::info!("pipeline stopped");
    }

    #[must_use]
    pub fn manager(&self) -> &Arc<SensorManager> {
        &self.manager
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<ConnectionRegistry<T>> {
        &self.registry
    }

    #[must_use]
    pub fn scheduler(&self) -> &Arc<BroadcastScheduler<T>> {
        &self.scheduler
    }

    #[must_use]
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }
}
