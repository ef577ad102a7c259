//! # sensorcast-domain
//!
//! Pure domain model for the sensorcast telemetry pipeline.
//!
//! ## Responsibilities
//! - Foundational types: connection identifiers, error conventions, timestamps
//! - Define **Readings** (one timestamped value produced by a provider)
//! - Define **Definitions** (static metadata describing a sensor)
//! - Define **Provider** descriptors (class, status, activation policy)
//! - Define the **wire protocol**: envelopes sent to subscribers and the
//!   commands subscribers may send back
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod command;
pub mod connection;
pub mod definition;
pub mod envelope;
pub mod provider;
pub mod reading;
