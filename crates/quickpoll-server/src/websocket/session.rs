//! WebSocket session lifecycle: one connected client from upgrade through
//! disconnect.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use metrics::{counter, gauge};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::connection::{ClientConnection, ConnectionId};
use super::protocol::handle_client_text;
use super::registry::SubscriptionRegistry;
use crate::config::ServerConfig;
use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_DISCONNECTIONS_TOTAL};

/// Why a session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEnd {
    /// Client closed the socket or the read side failed.
    ClientGone,
    /// The writer could not deliver to the socket.
    WriteFailed,
    /// No client frame within the keepalive timeout.
    KeepaliveTimeout,
    /// The broadcaster gave up on this connection.
    Purged,
    /// Server shutdown.
    Shutdown,
}

/// Run a WebSocket session for a connected client.
///
/// 1. Registers the connection
/// 2. Applies inbound `subscribe` frames
/// 3. Forwards queued outbound messages and sends periodic pings
/// 4. Unregisters exactly once, whatever ended the session
#[instrument(skip_all, fields(conn_id = %connection_id))]
pub async fn run_ws_session(
    ws: WebSocket,
    connection_id: ConnectionId,
    registry: Arc<SubscriptionRegistry>,
    config: Arc<ServerConfig>,
    shutdown: CancellationToken,
) -> SessionEnd {
    let (mut ws_tx, mut ws_rx) = ws.split();

    let (send_tx, mut send_rx) = mpsc::channel::<Arc<String>>(config.send_queue_capacity);
    let connection = Arc::new(ClientConnection::new(connection_id, send_tx));

    registry.register(&connection);
    info!("client connected");
    counter!(WS_CONNECTIONS_TOTAL).increment(1);
    gauge!(WS_CONNECTIONS_ACTIVE).increment(1.0);

    let writer_conn = connection.clone();
    let ping_every = config.ping_interval();
    let pong_timeout = config.pong_timeout();
    let ack_timeout = config.send_timeout();
    let mut writer = tokio::spawn(async move {
        let mut ping_interval = tokio::time::interval(ping_every);
        // skip the immediate first tick
        let _ = ping_interval.tick().await;

        loop {
            tokio::select! {
                msg = send_rx.recv() => {
                    let Some(text) = msg else {
                        return SessionEnd::ClientGone;
                    };
                    if ws_tx.send(Message::Text(text.as_str().into())).await.is_err() {
                        return SessionEnd::WriteFailed;
                    }
                }
                _ = ping_interval.tick() => {
                    if !writer_conn.check_alive() && writer_conn.last_pong_elapsed() > pong_timeout {
                        warn!(timeout = ?pong_timeout, "client unresponsive, disconnecting");
                        return SessionEnd::KeepaliveTimeout;
                    }
                    if ws_tx.send(Message::Ping(Default::default())).await.is_err() {
                        return SessionEnd::WriteFailed;
                    }
                }
            }
        }
    });

    let reader = async {
        while let Some(frame) = ws_rx.next().await {
            let msg = match frame {
                Ok(msg) => msg,
                Err(e) => {
                    debug!(error = %e, "read error");
                    break;
                }
            };
            connection.mark_alive();

            let text = match msg {
                Message::Text(ref t) => Some(t.as_str().to_owned()),
                Message::Binary(ref data) => {
                    let text = std::str::from_utf8(data).ok().map(str::to_string);
                    if text.is_none() {
                        debug!(len = data.len(), "ignoring non-UTF8 binary frame");
                    }
                    text
                }
                Message::Close(_) => {
                    debug!("client sent close frame");
                    break;
                }
                Message::Ping(_) | Message::Pong(_) => None,
            };

            if let Some(text) = text {
                let _ = handle_client_text(&text, &connection, &registry, ack_timeout).await;
            }
        }
    };

    let end = tokio::select! {
        () = reader => SessionEnd::ClientGone,
        res = &mut writer => res.unwrap_or(SessionEnd::WriteFailed),
        () = connection.closed() => SessionEnd::Purged,
        () = shutdown.cancelled() => SessionEnd::Shutdown,
    };

    writer.abort();
    let _ = registry.unregister(&connection.id);
    counter!(WS_DISCONNECTIONS_TOTAL).increment(1);
    gauge!(WS_CONNECTIONS_ACTIVE).decrement(1.0);
    info!(
        reason = ?end,
        duration_secs = connection.connected_at.elapsed().as_secs(),
        dropped = connection.drop_count(),
        "client disconnected"
    );
    end
}
