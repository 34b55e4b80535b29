use std::collections::HashMap;

use redtag_core::types::{DbId, Timestamp};
use redtag_db::models::communication_log::UrgentNote;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, RwLock};

/// Notes buffered per stream before further notes to it are dropped.
pub const STREAM_BUFFER_CAPACITY: usize = 64;

/// Channel sender half for pushing urgent notes to one open stream.
pub type StreamSender = mpsc::Sender<UrgentNote>;

/// Metadata for a single open stream.
pub struct StreamConnection {
    /// The authenticated user who opened the stream.
    pub user_id: DbId,
    /// Channel sender for outbound notes to this connection.
    pub sender: StreamSender,
    /// When this connection was established.
    pub connected_at: Timestamp,
}

/// Registry of every open urgent-note stream in this process.
///
/// Thread-safe via interior `RwLock`: `broadcast` holds the read lock for
/// the whole fan-out, so a connection registered concurrently is either
/// fully included or fully excluded. Wrap in `Arc` and share through
/// `AppState`.
pub struct StreamManager {
    connections: RwLock<HashMap<String, StreamConnection>>,
}

impl StreamManager {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection.
    ///
    /// Returns the receiver half of the channel; the caller turns it into
    /// the response body. Re-using an id replaces the earlier connection.
    pub async fn add(&self, conn_id: String, user_id: DbId) -> mpsc::Receiver<UrgentNote> {
        let (tx, rx) = mpsc::channel(STREAM_BUFFER_CAPACITY);
        let conn = StreamConnection {
            user_id,
            sender: tx,
            connected_at: chrono::Utc::now(),
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    /// Remove a connection by its id. Unknown ids are ignored.
    pub async fn remove(&self, conn_id: &str) {
        if let Some(conn) = self.connections.write().await.remove(conn_id) {
            let open_secs = (chrono::Utc::now() - conn.connected_at).num_seconds();
            tracing::debug!(conn_id, user_id = conn.user_id, open_secs, "Stream unregistered");
        }
    }

    /// Send `note` to every registered connection.
    ///
    /// Never waits on a slow reader. A closed channel, or one whose buffer
    /// is full, is logged and skipped; the remaining connections still
    /// receive the note. Returns the number of successful deliveries.
    pub async fn broadcast(&self, note: &UrgentNote) -> usize {
        let conns = self.connections.read().await;
        let mut delivered = 0;
        for (conn_id, conn) in conns.iter() {
            match conn.sender.try_send(note.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => tracing::warn!(
                    conn_id = %conn_id,
                    user_id = conn.user_id,
                    entry_id = note.id,
                    "Urgent note dropped: stream buffer full"
                ),
                Err(TrySendError::Closed(_)) => tracing::warn!(
                    conn_id = %conn_id,
                    user_id = conn.user_id,
                    entry_id = note.id,
                    "Urgent note not delivered: stream closed"
                ),
            }
        }
        delivered
    }

    /// Return the current number of open connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Drop every sender, ending all open streams, then clear the map.
    ///
    /// Used during graceful shutdown so long-lived responses complete and
    /// the server can drain.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        conns.clear();
        tracing::info!(count, "Closed all urgent-note streams");
    }
}

impl Default for StreamManager {
    fn default() -> Self {
        Self::new()
    }
}
