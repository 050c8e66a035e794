//! WebSocket client connection state.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Opaque identifier of one live connection (`conn_<uuid v7>`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Generate a fresh, time-ordered ID.
    pub fn generate() -> Self {
        Self(format!("conn_{}", Uuid::now_v7()))
    }

    /// The ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConnectionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A connected WebSocket client.
///
/// Owned by its session task. Everything else, including the subscription
/// registry, reaches it through a `Weak` or a short-lived `Arc` snapshot.
pub struct ClientConnection {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// Send channel to the client's WebSocket write task.
    tx: mpsc::Sender<Arc<String>>,
    /// When this connection was established.
    pub connected_at: Instant,
    /// Whether the client has shown activity since the last ping check.
    pub is_alive: AtomicBool,
    /// When the last frame from the client arrived.
    last_pong: Mutex<Instant>,
    /// Messages that could not be enqueued.
    pub dropped_messages: AtomicU64,
    /// Cancelled when the server gives up on this connection.
    closed: CancellationToken,
}

impl ClientConnection {
    /// Create a new connection.
    pub fn new(id: ConnectionId, tx: mpsc::Sender<Arc<String>>) -> Self {
        let now = Instant::now();
        Self {
            id,
            tx,
            connected_at: now,
            is_alive: AtomicBool::new(true),
            last_pong: Mutex::new(now),
            dropped_messages: AtomicU64::new(0),
            closed: CancellationToken::new(),
        }
    }

    /// Enqueue a message, waiting up to `timeout` for queue space.
    ///
    /// Returns `false` if the connection was closed, the queue is closed,
    /// or it stayed full for the whole timeout.
    pub async fn send_timeout(&self, message: Arc<String>, timeout: Duration) -> bool {
        if self.is_closed() {
            return false;
        }
        if self.tx.send_timeout(message, timeout).await.is_ok() {
            true
        } else {
            let _ = self.dropped_messages.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    /// Serialize a value and enqueue it, waiting up to `timeout`.
    pub async fn send_json<T: serde::Serialize + Sync>(&self, value: &T, timeout: Duration) -> bool {
        match serde_json::to_string(value) {
            Ok(json) => self.send_timeout(Arc::new(json), timeout).await,
            Err(_) => false,
        }
    }

    /// Total messages dropped for this connection.
    pub fn drop_count(&self) -> u64 {
        self.dropped_messages.load(Ordering::Relaxed)
    }

    /// Record client activity.
    pub fn mark_alive(&self) {
        self.is_alive.store(true, Ordering::Relaxed);
        *self.last_pong.lock() = Instant::now();
    }

    /// Check and reset the alive flag.
    pub fn check_alive(&self) -> bool {
        self.is_alive.swap(false, Ordering::Relaxed)
    }

    /// Time since the last client frame (or connection establishment).
    pub fn last_pong_elapsed(&self) -> Duration {
        self.last_pong.lock().elapsed()
    }

    /// Ask the owning session to terminate.
    pub fn close(&self) {
        self.closed.cancel();
    }

    /// Whether [`ClientConnection::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Resolves once [`ClientConnection::close`] has been called.
    pub async fn closed(&self) {
        self.closed.cancelled().await;
    }
}

impl fmt::Debug for ClientConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConnection")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
