//! # sensorcast-app
//!
//! Application layer: the telemetry pipeline and its **port definitions**.
//!
//! ## Responsibilities
//! - Define **port traits** that adapters implement:
//!   - `Provider`: a data source that can be initialised, polled and closed
//!   - `Transport`: the outbound half of one subscriber connection
//! - Run the pipeline:
//!   - `SensorManager` activates providers with priority fallback, polls
//!     them and caches the latest readings per source
//!   - `BroadcastScheduler` periodically turns the cache into a
//!     `sensor_data` envelope and fans it out
//!   - `ConnectionRegistry` tracks live subscribers, delivers envelopes,
//!     sweeps stale connections
//!   - `session`: per-connection receive loop with heartbeats and
//!     command handling
//!   - `Pipeline` wires the above together and owns shutdown order
//!
//! ## Dependency rule
//! Depends on `sensorcast-domain` only (plus `tokio` for tasks and channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod channel;
pub mod commands;
pub mod pipeline;
pub mod ports;
pub mod registry;
pub mod scheduler;
pub mod sensor_manager;
pub mod session;
pub mod task;

#[cfg(test)]
pub(crate) mod testing;
