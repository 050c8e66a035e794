//! Prometheus metrics recorder and metric names.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Install the global Prometheus recorder.
///
/// Returns the handle used to render `/metrics`. Fails if a recorder is
/// already installed.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    info!("prometheus metrics recorder installed");
    Ok(handle)
}

/// WebSocket connections opened (counter).
pub const WS_CONNECTIONS_TOTAL: &str = "ws_connections_total";
/// WebSocket connections closed (counter).
pub const WS_DISCONNECTIONS_TOTAL: &str = "ws_disconnections_total";
/// Live WebSocket connections (gauge).
pub const WS_CONNECTIONS_ACTIVE: &str = "ws_connections_active";
/// Accepted subscribe requests (counter).
pub const WS_SUBSCRIPTIONS_TOTAL: &str = "ws_subscriptions_total";
/// Events handed to the broadcaster (counter, labels: `event_type`).
pub const BROADCAST_EVENTS_TOTAL: &str = "broadcast_events_total";
/// Failed per-recipient sends (counter).
pub const BROADCAST_SEND_FAILURES_TOTAL: &str = "broadcast_send_failures_total";
/// Connections unregistered after a failed send (counter).
pub const BROADCAST_PURGED_CONNECTIONS_TOTAL: &str = "broadcast_purged_connections_total";
/// Successful poll mutations (counter, labels: `kind`).
pub const POLL_MUTATIONS_TOTAL: &str = "poll_mutations_total";
