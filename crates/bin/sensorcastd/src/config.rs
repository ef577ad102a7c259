//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `sensorcast.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

use sensorcast_app::pipeline::PipelineSettings;
use sensorcast_app::scheduler::SchedulerSettings;
use sensorcast_app::sensor_manager::ManagerSettings;
use sensorcast_app::session::SessionSettings;
use sensorcast_domain::provider::ActivationPolicy;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Provider polling and activation.
    pub sensors: SensorsConfig,
    /// Broadcasting and connection management.
    pub realtime: RealtimeConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SensorsConfig {
    pub poll_interval_seconds: u64,
    pub read_timeout_seconds: u64,
    /// Upper bound of the per-provider retry delay after failed reads.
    pub max_backoff_seconds: u64,
    pub activation_policy: ActivationPolicy,
    /// Try the host hardware provider before falling back to the mock.
    pub host_enabled: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RealtimeConfig {
    pub broadcast_interval_seconds: u64,
    pub max_broadcast_interval_seconds: u64,
    /// Consecutive failed ticks before the interval doubles.
    pub error_threshold: u32,
    pub max_connections: usize,
    pub stale_connection_timeout_seconds: u64,
    pub sweep_interval_seconds: u64,
    pub heartbeat_interval_seconds: u64,
    pub missed_heartbeats: u32,
    /// Frames queued per connection before it counts as backpressured.
    pub outbound_buffer: usize,
    pub shutdown_grace_seconds: u64,
}

impl Config {
    /// Load configuration from `sensorcast.toml` (if present), apply
    /// environment-variable overrides, then validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is unreadable or
    /// malformed, or if a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("sensorcast.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("SENSORCAST_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("SENSORCAST_PORT")
            && let Ok(port) = val.parse()
        {
            self.server.port = port;
        }
        if let Ok(val) = std::env::var("SENSORCAST_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("SENSORCAST_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
        override_parsed("SENSORCAST_POLL_INTERVAL", &mut self.sensors.poll_interval_seconds);
        override_parsed(
            "SENSORCAST_BROADCAST_INTERVAL",
            &mut self.realtime.broadcast_interval_seconds,
        );
        override_parsed("SENSORCAST_MAX_CONNECTIONS", &mut self.realtime.max_connections);
        override_parsed(
            "SENSORCAST_STALE_TIMEOUT",
            &mut self.realtime.stale_connection_timeout_seconds,
        );
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        let intervals = [
            ("sensors.poll_interval_seconds", self.sensors.poll_interval_seconds),
            ("sensors.read_timeout_seconds", self.sensors.read_timeout_seconds),
            ("sensors.max_backoff_seconds", self.sensors.max_backoff_seconds),
            (
                "realtime.broadcast_interval_seconds",
                self.realtime.broadcast_interval_seconds,
            ),
            (
                "realtime.max_broadcast_interval_seconds",
                self.realtime.max_broadcast_interval_seconds,
            ),
            (
                "realtime.stale_connection_timeout_seconds",
                self.realtime.stale_connection_timeout_seconds,
            ),
            ("realtime.sweep_interval_seconds", self.realtime.sweep_interval_seconds),
            (
                "realtime.heartbeat_interval_seconds",
                self.realtime.heartbeat_interval_seconds,
            ),
        ];
        if let Some((name, _)) = intervals.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::Validation(format!("{name} must be positive")));
        }
        if self.realtime.max_broadcast_interval_seconds < self.realtime.broadcast_interval_seconds
        {
            return Err(ConfigError::Validation(
                "realtime.max_broadcast_interval_seconds must not be below the broadcast interval"
                    .to_string(),
            ));
        }
        if self.realtime.max_connections == 0 {
            return Err(ConfigError::Validation(
                "realtime.max_connections must be positive".to_string(),
            ));
        }
        if self.realtime.outbound_buffer == 0 {
            return Err(ConfigError::Validation(
                "realtime.outbound_buffer must be positive".to_string(),
            ));
        }
        if self.realtime.missed_heartbeats == 0 {
            return Err(ConfigError::Validation(
                "realtime.missed_heartbeats must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Translate into the pipeline's typed settings.
    #[must_use]
    pub fn pipeline_settings(&self) -> PipelineSettings {
        let sensors = &self.sensors;
        let realtime = &self.realtime;
        let shutdown_grace = Duration::from_secs(realtime.shutdown_grace_seconds);
        PipelineSettings {
            manager: ManagerSettings {
                poll_interval: Duration::from_secs(sensors.poll_interval_seconds),
                read_timeout: Duration::from_secs(sensors.read_timeout_seconds),
                max_backoff: Duration::from_secs(sensors.max_backoff_seconds),
                activation_policy: sensors.activation_policy,
                shutdown_grace,
            },
            scheduler: SchedulerSettings {
                interval: Duration::from_secs(realtime.broadcast_interval_seconds),
                max_interval: Duration::from_secs(realtime.max_broadcast_interval_seconds),
                error_threshold: realtime.error_threshold,
                shutdown_grace,
            },
            session: SessionSettings {
                heartbeat_interval: Duration::from_secs(realtime.heartbeat_interval_seconds),
                missed_heartbeats: realtime.missed_heartbeats,
            },
            max_connections: realtime.max_connections,
            stale_timeout: Duration::from_secs(realtime.stale_connection_timeout_seconds),
            sweep_interval: Duration::from_secs(realtime.sweep_interval_seconds),
            outbound_buffer: realtime.outbound_buffer,
            shutdown_grace,
        }
    }
}

fn override_parsed<T: std::str::FromStr>(name: &str, target: &mut T) {
    if let Ok(val) = std::env::var(name) {
        match val.parse() {
            Ok(parsed) => *target = parsed,
            Err(_) => eprintln!("ignoring {name}={val}: not a valid number"),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8100,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "sensorcastd=info,sensorcast=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for SensorsConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 2,
            read_timeout_seconds: 5,
            max_backoff_seconds: 60,
            activation_policy: ActivationPolicy::default(),
            host_enabled: true,
        }
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            broadcast_interval_seconds: 2,
            max_broadcast_interval_seconds: 30,
            error_threshold: 10,
            max_connections: 100,
            stale_connection_timeout_seconds: 300,
            sweep_interval_seconds: 60,
            heartbeat_interval_seconds: 30,
            missed_heartbeats: 3,
            outbound_buffer: 32,
            shutdown_grace_seconds: 5,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
