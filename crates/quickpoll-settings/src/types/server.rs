//! HTTP and WebSocket server settings.

use serde::{Deserialize, Serialize};

/// Network, CORS, and WebSocket tuning.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// Origins allowed by CORS.
    pub cors_origins: Vec<String>,
    /// Largest accepted inbound WebSocket message in bytes.
    pub max_message_size: usize,
    /// Capacity of each connection's outbound queue.
    pub send_queue_capacity: usize,
    /// How long a broadcast waits on one full outbound queue before
    /// treating the connection as dead.
    pub send_timeout_ms: u64,
    /// Interval between WebSocket pings.
    pub ping_interval_secs: u64,
    /// Silence after which a client is considered gone.
    pub pong_timeout_secs: u64,
    /// Grace period for in-flight work at shutdown.
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["http://localhost:3000".to_string()],
            max_message_size: 64 * 1024,
            send_queue_capacity: 256,
            send_timeout_ms: 1000,
            ping_interval_secs: 30,
            pong_timeout_secs: 60,
            shutdown_timeout_secs: 10,
        }
    }
}
