//! WebSocket endpoint streaming envelopes to subscribers.
//!
//! Each upgraded socket is split in two. The write half is owned by a
//! writer task draining the connection's [`ChannelTransport`] queue; the
//! read half is mapped to [`InboundFrame`]s and handed to the session loop,
//! which registers the connection, answers commands and enforces
//! heartbeats.

use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures_util::{Sink, SinkExt as _, StreamExt as _};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use sensorcast_app::channel::{ChannelTransport, Outbound};
use sensorcast_app::session::{self, InboundFrame};

use crate::state::AppState;

/// `GET /ws`
pub async fn upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let pipeline = &state.pipeline;
    let (transport, outbound) = ChannelTransport::channel(pipeline.settings().outbound_buffer);
    let (sink, stream) = socket.split();
    let writer = tokio::spawn(write_loop(sink, outbound));

    let inbound = stream.map(inbound_frame);
    match session::serve(
        pipeline.scheduler(),
        transport,
        inbound,
        pipeline.settings().session,
    )
    .await
    {
        Ok(reason) => tracing::debug!(reason = reason.as_str(), "websocket session ended"),
        Err(err) => tracing::warn!(error = %err, "websocket connection refused"),
    }

    finish_writer(writer, pipeline.settings().shutdown_grace).await;
}

/// Let the writer flush what is queued, then abort it so a peer that
/// stopped reading cannot pin the socket.
async fn finish_writer(mut writer: JoinHandle<()>, grace: Duration) {
    match tokio::time::timeout(grace, &mut writer).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => tracing::warn!(error = %err, "websocket writer task failed"),
        Err(_) => {
            tracing::debug!(?grace, "websocket writer stalled, aborting");
            writer.abort();
            let _ = writer.await;
        }
    }
}

/// Strip socket details from a received message.
///
/// Read errors end the session like a close frame. Client pings count as
/// liveness, the same as pongs; axum answers them itself.
fn inbound_frame(message: Result<WsMessage, axum::Error>) -> InboundFrame {
    match message {
        Ok(WsMessage::Text(text)) => InboundFrame::Text(text.as_str().to_owned()),
        Ok(WsMessage::Binary(bytes)) => InboundFrame::Binary(bytes.to_vec()),
        Ok(WsMessage::Ping(_) | WsMessage::Pong(_)) => InboundFrame::Pong,
        Ok(WsMessage::Close(_)) => InboundFrame::Close,
        Err(err) => {
            tracing::debug!(error = %err, "websocket read failed");
            InboundFrame::Close
        }
    }
}

/// Write queued frames until the queue closes, a close is requested or
/// the socket stops accepting writes.
async fn write_loop<S>(mut sink: S, mut outbound: mpsc::Receiver<Outbound>)
where
    S: Sink<WsMessage> + Unpin,
{
    while let Some(frame) = outbound.recv().await {
        let message = match frame {
            Outbound::Envelope(envelope) => match envelope.to_json() {
                Ok(json) => WsMessage::Text(json.into()),
                Err(err) => {
                    tracing::error!(error = %err, kind = envelope.kind(), "failed to encode envelope");
                    continue;
                }
            },
            Outbound::Ping => WsMessage::Ping(Bytes::new()),
            Outbound::Close => {
                let _ = sink.send(WsMessage::Close(None)).await;
                break;
            }
        };
        if sink.send(message).await.is_err() {
            break;
        }
    }
}
