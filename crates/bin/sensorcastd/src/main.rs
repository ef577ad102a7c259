//! # sensorcastd
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Install the `tracing` subscriber
//! - Build the provider priority list (host hardware, then the mock fallback)
//! - Start the pipeline: manager, broadcast scheduler, stale sweeper
//! - Build the axum router and serve until SIGINT/SIGTERM
//! - Drain HTTP, then shut the pipeline down in order
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context as _;
use tracing_subscriber::EnvFilter;

use sensorcast_adapter_http_axum::state::AppState;
use sensorcast_adapter_mock::MockProvider;
use sensorcast_adapter_sysinfo::HostProvider;
use sensorcast_app::pipeline::Pipeline;
use sensorcast_app::ports::DynProvider;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.logging.filter)
                .context("parsing the logging filter")?,
        )
        .init();

    let mut providers: Vec<Box<dyn DynProvider>> = Vec::new();
    if config.sensors.host_enabled {
        providers.push(Box::new(HostProvider::new()));
    }
    providers.push(Box::new(MockProvider::new()));

    let pipeline = Arc::new(Pipeline::new(providers, config.pipeline_settings()));
    pipeline
        .start()
        .await
        .context("starting the sensor pipeline")?;

    let app = sensorcast_adapter_http_axum::router::build(AppState::new(Arc::clone(&pipeline)));

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    tracing::info!(address = %bind_addr, "sensorcastd listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    pipeline.shutdown().await;
    served.context("serving http")?;
    tracing::info!("sensorcastd stopped");
    Ok(())
}

/// Resolve on the first of SIGINT or SIGTERM.
///
/// A handler that cannot be installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
