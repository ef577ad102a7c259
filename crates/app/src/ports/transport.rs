//! Transport port: the outbound half of one subscriber connection.

use std::future::Future;
use std::sync::Arc;

use sensorcast_domain::envelope::Envelope;

/// Why a transport refused an outbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The peer is gone.
    #[error("transport is closed")]
    Closed,

    /// The bounded outbound queue is full.
    #[error("outbound queue is full")]
    Backpressure,
}

/// Delivers frames to a single subscriber.
///
/// Implementations must not block on a slow peer: a full queue is reported
/// as [`TransportError::Backpressure`] so one subscriber can never stall a
/// fan-out.
pub trait Transport: Send + Sync + 'static {
    /// Queue an envelope for delivery.
    fn send(
        &self,
        envelope: Arc<Envelope>,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Queue a transport-level liveness probe.
    fn ping(&self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Ask the peer to close. Best effort.
    fn close(&self) -> impl Future<Output = ()> + Send;
}
