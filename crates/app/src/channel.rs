//! Channel-backed [`Transport`] used by socket adapters.
//!
//! The registry side holds a [`ChannelTransport`]; the adapter's writer
//! task drains the matching receiver and turns each [`Outbound`] frame
//! into a socket write. The queue is bounded so a slow peer surfaces as
//! [`TransportError::Backpressure`] instead of unbounded memory growth.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use sensorcast_domain::envelope::Envelope;

use crate::ports::{Transport, TransportError};

/// A frame waiting to be written to the socket.
#[derive(Debug, Clone)]
pub enum Outbound {
    Envelope(Arc<Envelope>),
    Ping,
    Close,
}

/// Registry-side handle of a bounded outbound queue.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    sender: mpsc::Sender<Outbound>,
}

impl ChannelTransport {
    /// Create a transport and the receiver its writer task should drain.
    ///
    /// `capacity` is clamped to at least one frame.
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Outbound>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    fn push(&self, frame: Outbound) -> Result<(), TransportError> {
        self.sender.try_send(frame).map_err(|err| match err {
            TrySendError::Full(_) => TransportError::Backpressure,
            TrySendError::Closed(_) => TransportError::Closed,
        })
    }
}

impl Transport for ChannelTransport {
    async fn send(&self, envelope: Arc<Envelope>) -> Result<(), TransportError> {
        self.push(Outbound::Envelope(envelope))
    }

    async fn ping(&self) -> Result<(), TransportError> {
        self.push(Outbound::Ping)
    }

    async fn close(&self) {
        // A full queue means the peer is not reading; dropping the sender
        // along with the registry entry ends the writer anyway.
        let _ = self.push(Outbound::Close);
    }
}
