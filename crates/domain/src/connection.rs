//! Connection metadata exposed to statistics consumers.

use serde::{Deserialize, Serialize};

use crate::id::ConnectionId;
use crate::time::Timestamp;

/// Snapshot of one subscriber connection's bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub id: ConnectionId,
    pub connected_at: Timestamp,
    pub messages_sent: u64,
    pub last_activity: Timestamp,
}
