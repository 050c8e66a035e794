//! Seam between the poll store and the real-time fan-out layer.

use async_trait::async_trait;

use crate::events::PollEvent;

/// Outcome of a single fan-out.
///
/// Informational only: delivery is best-effort and a report with failures is
/// still a successful call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Connections the event was addressed to.
    pub recipients: usize,
    /// Connections that accepted the message.
    pub delivered: usize,
    /// Connections whose send failed and were purged.
    pub failed: usize,
}

/// Receiver of committed poll events.
///
/// The poll store calls [`EventSink::deliver`] exactly once per successful
/// mutation, after its transaction commits. Implementations must not fail
/// or panic on delivery problems.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Hand one event to the sink.
    async fn deliver(&self, event: PollEvent) -> DeliveryReport;
}
