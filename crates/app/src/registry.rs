//! Connection registry: live subscribers and fan-out delivery.
//!
//! The registry is the only owner of connection metadata. Broadcasts
//! iterate a snapshot taken under a short lock, so accepts and removals
//! never wait on a slow send and a send never observes a half-updated map.
//!
//! Any transport failure removes the connection; callers only ever see a
//! `bool` or a delivery count.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::future::join_all;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use sensorcast_domain::connection::ConnectionInfo;
use sensorcast_domain::envelope::{Envelope, Message};
use sensorcast_domain::error::SensorcastError;
use sensorcast_domain::id::ConnectionId;
use sensorcast_domain::time::{Timestamp, now};

use crate::ports::Transport;
use crate::task::BackgroundTask;

const WELCOME: &str = "Connected to real-time sensor stream";

struct Connection<T> {
    transport: T,
    connected_at: Timestamp,
    messages_sent: AtomicU64,
    activity: Mutex<Activity>,
    removed: CancellationToken,
}

#[derive(Debug, Clone, Copy)]
struct Activity {
    at: Instant,
    wall: Timestamp,
}

impl Activity {
    fn now() -> Self {
        Self {
            at: Instant::now(),
            wall: now(),
        }
    }
}

impl<T> Connection<T> {
    fn touch(&self) {
        *self.activity.lock().unwrap_or_else(PoisonError::into_inner) = Activity::now();
    }

    fn activity(&self) -> Activity {
        *self.activity.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn idle_for(&self) -> Duration {
        Instant::now().duration_since(self.activity().at)
    }

    fn info(&self, id: ConnectionId) -> ConnectionInfo {
        ConnectionInfo {
            id,
            connected_at: self.connected_at,
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            last_activity: self.activity().wall,
        }
    }
}

/// Tracks live subscriber connections of transport type `T`.
pub struct ConnectionRegistry<T> {
    max_connections: usize,
    connections: RwLock<HashMap<ConnectionId, Arc<Connection<T>>>>,
}

impl<T: Transport> ConnectionRegistry<T> {
    /// Create an empty registry admitting at most `max_connections` members.
    #[must_use]
    pub fn new(max_connections: usize) -> Self {
        Self {
            max_connections,
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register `transport` and greet it with `connection_established`.
    ///
    /// # Errors
    ///
    /// - [`SensorcastError::CapacityReached`] when the registry is full; the
    ///   transport is closed before returning.
    /// - [`SensorcastError::ConnectionLost`] when the welcome could not be
    ///   delivered; the connection has already been removed.
    pub async fn accept(&self, transport: T) -> Result<ConnectionId, SensorcastError> {
        let id = ConnectionId::new();
        let rejected = {
            let mut connections = self.write();
            if connections.len() >= self.max_connections {
                Some(transport)
            } else {
                connections.insert(
                    id,
                    Arc::new(Connection {
                        transport,
                        connected_at: now(),
                        messages_sent: AtomicU64::new(0),
                        activity: Mutex::new(Activity::now()),
                        removed: CancellationToken::new(),
                    }),
                );
                None
            }
        };

        if let Some(transport) = rejected {
            tracing::warn!(max = self.max_connections, "connection rejected, registry full");
            transport.close().await;
            return Err(SensorcastError::CapacityReached {
                max: self.max_connections,
            });
        }

        tracing::info!(connection_id = %id, total = self.len(), "connection accepted");
        let welcome = Envelope::new(Message::ConnectionEstablished {
            connection_id: id,
            message: WELCOME.to_string(),
        });
        if !self.send(id, Arc::new(welcome)).await {
            return Err(SensorcastError::ConnectionLost);
        }
        Ok(id)
    }

    /// Deliver `envelope` to one connection.
    ///
    /// Returns `false` when the connection is unknown or its transport
    /// failed, in which case it has been removed.
    pub async fn send(&self, id: ConnectionId, envelope: Arc<Envelope>) -> bool {
        let Some(connection) = self.get(id) else {
            return false;
        };
        match connection.transport.send(envelope).await {
            Ok(()) => {
                connection.messages_sent.fetch_add(1, Ordering::Relaxed);
                connection.touch();
                true
            }
            Err(err) => {
                tracing::debug!(connection_id = %id, error = %err, "send failed");
                self.disconnect(id, "send failed").await;
                false
            }
        }
    }

    /// Deliver `envelope` to every current connection concurrently.
    ///
    /// Returns the number of successful deliveries.
    pub async fn broadcast(&self, envelope: Arc<Envelope>) -> usize {
        let ids: Vec<ConnectionId> = self.read().keys().copied().collect();
        let results = join_all(
            ids.into_iter()
                .map(|id| self.send(id, Arc::clone(&envelope))),
        )
        .await;
        results.into_iter().filter(|delivered| *delivered).count()
    }

    /// Send a transport-level liveness probe.
    ///
    /// Returns `false` (and removes the connection) when the probe cannot
    /// be queued.
    pub async fn ping(&self, id: ConnectionId) -> bool {
        let Some(connection) = self.get(id) else {
            return false;
        };
        if let Err(err) = connection.transport.ping().await {
            tracing::debug!(connection_id = %id, error = %err, "ping failed");
            self.disconnect(id, "ping failed").await;
            return false;
        }
        true
    }

    /// Record inbound activity on a connection.
    pub fn touch(&self, id: ConnectionId) {
        if let Some(connection) = self.get(id) {
            connection.touch();
        }
    }

    /// Remove a connection and close its transport.
    ///
    /// Returns `false` if it was already gone.
    pub async fn disconnect(&self, id: ConnectionId, reason: &str) -> bool {
        let removed = self.write().remove(&id);
        let Some(connection) = removed else {
            return false;
        };
        self.release(id, &connection, reason).await;
        true
    }

    async fn release(&self, id: ConnectionId, connection: &Connection<T>, reason: &str) {
        connection.removed.cancel();
        connection.transport.close().await;
        tracing::info!(connection_id = %id, reason, remaining = self.len(), "connection closed");
    }

    /// Remove every connection idle for longer than `threshold`.
    ///
    /// Returns how many were removed.
    /// Idleness is checked again under the write lock, so a connection that
    /// saw activity while earlier ones were being closed survives.
    pub async fn sweep_stale(&self, threshold: Duration) -> usize {
        let candidates: Vec<ConnectionId> = self
            .read()
            .iter()
            .filter(|(_, connection)| connection.idle_for() > threshold)
            .map(|(id, _)| *id)
            .collect();

        let mut removed = 0;
        for id in candidates {
            let stale = {
                let mut connections = self.write();
                let still_idle = connections
                    .get(&id)
                    .is_some_and(|connection| connection.idle_for() > threshold);
                if still_idle { connections.remove(&id) } else { None }
            };
            if let Some(connection) = stale {
                self.release(id, &connection, "stale").await;
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::info!(count = removed, "stale connections swept");
        }
        removed
    }

    /// Remove and close every connection.
    pub async fn close_all(&self) -> usize {
        let drained: Vec<_> = self.write().drain().collect();
        let count = drained.len();
        for (_, connection) in drained {
            connection.removed.cancel();
            connection.transport.close().await;
        }
        if count > 0 {
            tracing::info!(count, "all connections closed");
        }
        count
    }

    /// Token cancelled when `id` leaves the registry, or `None` if it
    /// already has.
    #[must_use]
    pub fn removal_signal(&self, id: ConnectionId) -> Option<CancellationToken> {
        self.get(id).map(|connection| connection.removed.clone())
    }

    #[must_use]
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.read().contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    #[must_use]
    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    /// Metadata of every connection, oldest first.
    #[must_use]
    pub fn connections(&self) -> Vec<ConnectionInfo> {
        let mut infos: Vec<_> = self
            .read()
            .iter()
            .map(|(id, connection)| connection.info(*id))
            .collect();
        infos.sort_by(|a, b| a.connected_at.cmp(&b.connected_at).then(a.id.cmp(&b.id)));
        infos
    }

    /// Periodically run [`sweep_stale`](Self::sweep_stale) until stopped.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration, threshold: Duration) -> BackgroundTask {
        let registry = Arc::clone(self);
        BackgroundTask::spawn("stale-sweeper", move |token| async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {
                        registry.sweep_stale(threshold).await;
                    }
                }
            }
        })
    }

    fn get(&self, id: ConnectionId) -> Option<Arc<Connection<T>>> {
        self.read().get(&id).cloned()
    }

    fn read(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, HashMap<ConnectionId, Arc<Connection<T>>>> {
        self.connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<ConnectionId, Arc<Connection<T>>>> {
        self.connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
