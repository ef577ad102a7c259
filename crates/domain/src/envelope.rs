//! The envelope is the only unit ever sent to subscribers.
//!
//! Every frame on the wire is a JSON object of the shape
//!
//! ```json
//! {"type": "sensor_data", "payload": { ... }, "timestamp": "...", "sequence": 42}
//! ```
//!
//! `sequence` is only present on periodic and forced sensor broadcasts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::connection::ConnectionInfo;
use crate::id::ConnectionId;
use crate::reading::Reading;
use crate::time::{Timestamp, now};

/// A timestamped, optionally sequenced wire message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(flatten)]
    pub message: Message,
    pub timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u64>,
}

impl Envelope {
    /// Wrap `message`, stamped with the current time.
    #[must_use]
    pub fn new(message: Message) -> Self {
        Self::at(message, now())
    }

    /// Wrap `message` with an explicit timestamp.
    #[must_use]
    pub fn at(message: Message, timestamp: Timestamp) -> Self {
        Self {
            message,
            timestamp,
            sequence: None,
        }
    }

    /// Attach a broadcast sequence number.
    #[must_use]
    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = Some(sequence);
        self
    }

    /// Wire name of the message type, for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.message.kind()
    }

    /// Encode as a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if a payload contains a non-finite
    /// float or another value JSON cannot represent.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Payload-carrying message variants, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Message {
    ConnectionEstablished {
        connection_id: ConnectionId,
        message: String,
    },
    SensorData(SensorData),
    StatsResponse(BroadcastStats),
    ForceBroadcastAck {
        success: bool,
    },
    HeartbeatResponse,
    Error {
        message: String,
        code: ErrorCode,
    },
    Ack {
        received: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        echo: Option<serde_json::Value>,
    },
}

impl Message {
    /// Wire name of this variant.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConnectionEstablished { .. } => "connection_established",
            Self::SensorData(_) => "sensor_data",
            Self::StatsResponse(_) => "stats_response",
            Self::ForceBroadcastAck { .. } => "force_broadcast_ack",
            Self::HeartbeatResponse => "heartbeat_response",
            Self::Error { .. } => "error",
            Self::Ack { .. } => "ack",
        }
    }
}

/// Machine-readable reason attached to `error` replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidCommand,
    UnsupportedFrame,
    Internal,
}

/// Per-source readings plus aggregate counters.
///
/// Only constructible through [`SensorData::new`], which derives the
/// counters from `sources` so they can never disagree with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorData {
    pub sources: BTreeMap<String, Vec<Reading>>,
    pub timestamp: Timestamp,
    pub total_sensors: usize,
    pub active_sources: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forced: Option<bool>,
}

impl SensorData {
    /// Aggregate `sources` into a broadcast payload.
    #[must_use]
    pub fn new(sources: BTreeMap<String, Vec<Reading>>, timestamp: Timestamp, forced: bool) -> Self {
        let total_sensors = sources.values().map(Vec::len).sum();
        let active_sources = sources.values().filter(|r| !r.is_empty()).count();
        Self {
            sources,
            timestamp,
            total_sensors,
            active_sources,
            forced: forced.then_some(true),
        }
    }
}

/// Broadcast scheduler statistics, returned to `get_stats` and the HTTP API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastStats {
    pub is_running: bool,
    pub broadcast_interval_seconds: f64,
    pub broadcasts_sent: u64,
    pub last_broadcast_time: Option<Timestamp>,
    pub errors_count: u64,
    pub connected_clients: usize,
    pub connections: Vec<ConnectionInfo>,
}
