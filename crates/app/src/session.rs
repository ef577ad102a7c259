//! Per-connection session loop.
//!
//! A session moves through `Connecting → Open → Closing → Closed`:
//!
//! - **Connecting**: [`serve`] registers the transport; a full registry
//!   ends the session right away.
//! - **Open**: inbound frames are awaited with a heartbeat timeout. Each
//!   timeout sends a transport-level ping; any inbound frame resets the
//!   miss counter and counts as activity.
//! - **Closing**: entered on a close frame, end of the inbound stream,
//!   too many consecutive missed heartbeats, or removal from the registry.
//! - **Closed**: the connection has left the registry and its transport
//!   was asked to close.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{Stream, StreamExt as _};

use sensorcast_domain::envelope::{Envelope, ErrorCode, Message};
use sensorcast_domain::error::SensorcastError;
use sensorcast_domain::id::ConnectionId;

use crate::commands;
use crate::ports::Transport;
use crate::scheduler::BroadcastScheduler;

/// A frame received from the subscriber, already stripped of socket details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    Text(String),
    Binary(Vec<u8>),
    Pong,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub heartbeat_interval: Duration,
    pub missed_heartbeats: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(30),
            missed_heartbeats: 3,
        }
    }
}

/// Why a session left the `Open` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    ClientClosed,
    StreamEnded,
    MissedHeartbeats,
    Removed,
}

impl CloseReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClientClosed => "client closed",
            Self::StreamEnded => "stream ended",
            Self::MissedHeartbeats => "missed heartbeats",
            Self::Removed => "removed",
        }
    }
}

/// Register `transport` and run its session until it closes.
///
/// # Errors
///
/// Returns [`SensorcastError::CapacityReached`] when the registry is full.
pub async fn serve<T, S>(
    scheduler: &BroadcastScheduler<T>,
    transport: T,
    inbound: S,
    settings: SessionSettings,
) -> Result<CloseReason, SensorcastError>
where
    T: Transport,
    S: Stream<Item = InboundFrame> + Unpin,
{
    let id = scheduler.registry().accept(transport).await?;
    Ok(run(scheduler, id, inbound, settings).await)
}

/// Drive an already registered connection until it closes.
pub async fn run<T, S>(
    scheduler: &BroadcastScheduler<T>,
    id: ConnectionId,
    mut inbound: S,
    settings: SessionSettings,
) -> CloseReason
where
    T: Transport,
    S: Stream<Item = InboundFrame> + Unpin,
{
    let registry = scheduler.registry();
    let Some(removed) = registry.removal_signal(id) else {
        return CloseReason::Removed;
    };
    tracing::debug!(connection_id = %id, "session open");

    let mut missed = 0u32;
    let reason = loop {
        let frame = tokio::select! {
            biased;
            () = removed.cancelled() => break CloseReason::Removed,
            frame = tokio::time::timeout(settings.heartbeat_interval, inbound.next()) => frame,
        };

        let frame = match frame {
            Err(_) => {
                missed += 1;
                if missed >= settings.missed_heartbeats {
                    break CloseReason::MissedHeartbeats;
                }
                tracing::trace!(connection_id = %id, missed, "heartbeat missed, pinging");
                if !registry.ping(id).await {
                    break CloseReason::Removed;
                }
                continue;
            }
            Ok(None) => break CloseReason::StreamEnded,
            Ok(Some(InboundFrame::Close)) => break CloseReason::ClientClosed,
            Ok(Some(frame)) => frame,
        };

        missed = 0;
        registry.touch(id);

        let reply = match frame {
            InboundFrame::Text(text) => Some(commands::handle(scheduler, &text).await),
            InboundFrame::Binary(_) => Some(Envelope::new(Message::Error {
                message: "binary frames are not supported".to_string(),
                code: ErrorCode::UnsupportedFrame,
            })),
            InboundFrame::Pong | InboundFrame::Close => None,
        };
        if let Some(reply) = reply
            && !registry.send(id, Arc::new(reply)).await
        {
            break CloseReason::Removed;
        }
    };

    registry.disconnect(id, reason.as_str()).await;
    tracing::debug!(connection_id = %id, reason = reason.as_str(), "session closed");
    reason
}
