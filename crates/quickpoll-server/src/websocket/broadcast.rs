//! Event fan-out to subscribed WebSocket clients.
//!
//! `deliver` resolves recipients, serializes once, sends to every recipient
//! concurrently with a per-recipient timeout, then purges whoever failed.
//! Failures never propagate to the caller.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use metrics::counter;
use quickpoll_core::{DeliveryReport, EventSink, PollEvent};
use tracing::{debug, info, warn};

use super::connection::ClientConnection;
use super::registry::SubscriptionRegistry;
use crate::metrics::{
    BROADCAST_EVENTS_TOTAL, BROADCAST_PURGED_CONNECTIONS_TOTAL, BROADCAST_SEND_FAILURES_TOTAL,
};

/// Delivers poll events to the connections the registry resolves.
pub struct Broadcaster {
    registry: Arc<SubscriptionRegistry>,
    send_timeout: Duration,
}

impl Broadcaster {
    /// Create a broadcaster over a shared registry.
    pub fn new(registry: Arc<SubscriptionRegistry>, send_timeout: Duration) -> Self {
        Self {
            registry,
            send_timeout,
        }
    }

    /// The registry recipients are resolved from.
    pub fn registry(&self) -> &Arc<SubscriptionRegistry> {
        &self.registry
    }

    fn recipients(&self, event: &PollEvent) -> Vec<Arc<ClientConnection>> {
        match event.target() {
            None => self.registry.resolve_global(),
            Some(poll_id) => self.registry.resolve_poll(poll_id),
        }
    }

    /// Deliver one event. Never fails; see [`DeliveryReport`] for the outcome.
    pub async fn deliver_event(&self, event: &PollEvent) -> DeliveryReport {
        let kind = event.kind();
        let poll_id = event.subject();
        counter!(BROADCAST_EVENTS_TOTAL, "event_type" => kind.as_str()).increment(1);

        let recipients = self.recipients(event);
        if recipients.is_empty() {
            debug!(event_type = %kind, poll_id, "no recipients");
            return DeliveryReport::default();
        }

        let payload = match event.to_json() {
            Ok(json) => Arc::new(json),
            Err(e) => {
                warn!(event_type = %kind, poll_id, error = %e, "failed to serialize event");
                return DeliveryReport {
                    recipients: recipients.len(),
                    delivered: 0,
                    failed: 0,
                };
            }
        };

        let timeout = self.send_timeout;
        let outcomes = join_all(
            recipients
                .iter()
                .map(|conn| conn.send_timeout(Arc::clone(&payload), timeout)),
        )
        .await;

        let failed: Vec<&Arc<ClientConnection>> = recipients
            .iter()
            .zip(outcomes)
            .filter_map(|(conn, ok)| (!ok).then_some(conn))
            .collect();

        for conn in &failed {
            warn!(conn_id = %conn.id, event_type = %kind, poll_id, "send failed, dropping connection");
            counter!(BROADCAST_SEND_FAILURES_TOTAL).increment(1);
            if self.registry.unregister(&conn.id) {
                counter!(BROADCAST_PURGED_CONNECTIONS_TOTAL).increment(1);
                info!(conn_id = %conn.id, "connection purged");
            }
            conn.close();
        }

        let report = DeliveryReport {
            recipients: recipients.len(),
            delivered: recipients.len() - failed.len(),
            failed: failed.len(),
        };
        debug!(
            event_type = %kind,
            poll_id,
            recipients = report.recipients,
            failed = report.failed,
            "event delivered"
        );
        report
    }
}

#[async_trait]
impl EventSink for Broadcaster {
    async fn deliver(&self, event: PollEvent) -> DeliveryReport {
        self.deliver_event(&event).await
    }
}
