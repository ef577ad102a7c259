//! Replies to inbound subscriber text frames.

use sensorcast_domain::command::ClientCommand;
use sensorcast_domain::envelope::{Envelope, ErrorCode, Message};

use crate::ports::Transport;
use crate::scheduler::BroadcastScheduler;

/// Interpret `text` and build the reply envelope.
///
/// Never fails: malformed input becomes an `ack` or `error` reply.
pub async fn handle<T: Transport>(scheduler: &BroadcastScheduler<T>, text: &str) -> Envelope {
    let message = match ClientCommand::parse(text) {
        ClientCommand::GetStats => Message::StatsResponse(scheduler.stats()),
        ClientCommand::ForceBroadcast => Message::ForceBroadcastAck {
            success: scheduler.force_broadcast().await,
        },
        ClientCommand::Heartbeat => Message::HeartbeatResponse,
        ClientCommand::Unrecognised(echo) => Message::Ack {
            received: true,
            echo: Some(echo),
        },
        ClientCommand::PlainText => Message::Ack {
            received: true,
            echo: None,
        },
        ClientCommand::Invalid(_) => Message::Error {
            message: "`command` must be a string".to_string(),
            code: ErrorCode::InvalidCommand,
        },
    };
    Envelope::new(message)
}
