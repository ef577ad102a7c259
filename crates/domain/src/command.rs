//! Inbound control commands sent by subscribers.
//!
//! Parsing never fails: anything that is not a recognised command is
//! classified so the caller can answer with an `ack` or `error` reply
//! instead of dropping the connection.

use serde_json::Value;

/// A classified inbound text frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    /// `{"command": "get_stats"}`
    GetStats,
    /// `{"command": "force_broadcast"}`
    ForceBroadcast,
    /// `{"command": "heartbeat"}`
    Heartbeat,
    /// Valid JSON that names no known command; echoed back in the `ack`.
    Unrecognised(Value),
    /// A JSON object whose `command` field is not a string.
    Invalid(Value),
    /// Text that is not JSON at all.
    PlainText,
}

impl ClientCommand {
    /// Classify an inbound text frame.
    ///
    /// The command name is read from `command`, falling back to the
    /// legacy `event` field.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let Ok(value) = serde_json::from_str::<Value>(text) else {
            return Self::PlainText;
        };

        let field = value
            .as_object()
            .and_then(|obj| obj.get("command").or_else(|| obj.get("event")));

        match field {
            None => Self::Unrecognised(value),
            Some(Value::String(name)) => match name.as_str() {
                "get_stats" => Self::GetStats,
                "force_broadcast" => Self::ForceBroadcast,
                "heartbeat" => Self::Heartbeat,
                _ => Self::Unrecognised(value),
            },
            Some(_) => Self::Invalid(value),
        }
    }
}
