//! Inbound client messages and their replies.

use std::time::Duration;

use metrics::counter;
use quickpoll_core::PollId;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::connection::ClientConnection;
use super::registry::SubscriptionRegistry;
use crate::metrics::WS_SUBSCRIPTIONS_TOTAL;

/// A message a client may send.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Follow updates for one poll.
    Subscribe {
        /// Poll to follow.
        poll_id: PollId,
    },
}

/// Acknowledgement of a subscribe request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Subscribed {
    #[serde(rename = "type")]
    kind: &'static str,
    /// Poll now followed.
    pub poll_id: PollId,
}

impl Subscribed {
    /// Ack for `poll_id`.
    pub fn new(poll_id: PollId) -> Self {
        Self {
            kind: "subscribed",
            poll_id,
        }
    }
}

/// Parse a client frame. Unknown or malformed input yields `None`.
pub fn parse_client_message(text: &str) -> Option<ClientMessage> {
    serde_json::from_str(text).ok()
}

/// Apply one client frame to the registry, acknowledging on the same
/// connection. Returns the poll subscribed to, if any.
///
/// The ack waits up to `ack_timeout` for queue space, like any broadcast
/// send. A connection that cannot take its ack is closed.
pub async fn handle_client_text(
    text: &str,
    connection: &ClientConnection,
    registry: &SubscriptionRegistry,
    ack_timeout: Duration,
) -> Option<PollId> {
    let Some(message) = parse_client_message(text) else {
        debug!(conn_id = %connection.id, len = text.len(), "ignoring unrecognized message");
        return None;
    };

    match message {
        ClientMessage::Subscribe { poll_id } => {
            if !registry.subscribe(&connection.id, poll_id) {
                debug!(conn_id = %connection.id, poll_id, "subscribe from unregistered connection");
                return None;
            }
            counter!(WS_SUBSCRIPTIONS_TOTAL).increment(1);
            debug!(conn_id = %connection.id, poll_id, "subscribed");

            if !connection.send_json(&Subscribed::new(poll_id), ack_timeout).await {
                warn!(conn_id = %connection.id, poll_id, "subscribe ack not delivered, closing");
                connection.close();
            }
            Some(poll_id)
        }
    }
}
