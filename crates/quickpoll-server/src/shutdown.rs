//! Graceful shutdown: one cancellation token for every task, plus a tracker
//! for the WebSocket sessions that `axum::serve` does not wait on.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tokio_util::task::task_tracker::TrackedFuture;
use tracing::{info, warn};

/// Fallback drain window when the caller gives none.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Coordinates shutdown of the HTTP listener and every WebSocket session.
#[derive(Default)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
    sessions: TaskTracker,
}

impl ShutdownCoordinator {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        Self::default()
    }

    /// A clone of the cancellation token.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Cancel the token. Sessions and the listener observe it and wind down.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Whether a shutdown has been initiated.
    pub fn is_shutting_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wrap a session future so [`ShutdownCoordinator::graceful_shutdown`]
    /// waits for it.
    pub fn track_session<F: Future>(&self, session: F) -> TrackedFuture<F> {
        self.sessions.track_future(session)
    }

    /// Sessions still running.
    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Cancel, then wait up to `timeout` for `handles` and every tracked
    /// session to finish. Returns `true` if everything drained in time.
    pub async fn graceful_shutdown(&self, handles: Vec<JoinHandle<()>>, timeout: Option<Duration>) -> bool {
        let timeout = timeout.unwrap_or(DRAIN_TIMEOUT);
        self.shutdown();
        let _ = self.sessions.close();
        info!(
            tasks = handles.len(),
            sessions = self.sessions.len(),
            timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            "draining"
        );

        let drain = async {
            let _ = futures::future::join_all(handles).await;
            self.sessions.wait().await;
        };
        let drained = tokio::time::timeout(timeout, drain).await.is_ok();
        if !drained {
            warn!(sessions = self.sessions.len(), "drain timed out after {timeout:?}");
        }
        drained
    }
}
