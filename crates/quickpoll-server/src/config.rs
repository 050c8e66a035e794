//! Server configuration.

use std::time::Duration;

use quickpoll_settings::ServerSettings;
use serde::{Deserialize, Serialize};

/// Runtime configuration for [`crate::server::QuickPollServer`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `0` for auto-assign).
    pub port: u16,
    /// Origins allowed by CORS.
    pub cors_origins: Vec<String>,
    /// Max inbound WebSocket message size in bytes.
    pub max_message_size: usize,
    /// Outbound queue capacity per connection.
    pub send_queue_capacity: usize,
    /// Per-recipient enqueue timeout during a broadcast, in milliseconds.
    pub send_timeout_ms: u64,
    /// Ping interval in seconds.
    pub ping_interval_secs: u64,
    /// Disconnect after this many seconds without any client frame.
    pub pong_timeout_secs: u64,
    /// Shutdown grace period in seconds.
    pub shutdown_timeout_secs: u64,
}

impl ServerConfig {
    /// Per-recipient send timeout.
    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    /// Ping interval.
    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }

    /// Keepalive timeout.
    pub fn pong_timeout(&self) -> Duration {
        Duration::from_secs(self.pong_timeout_secs)
    }

    /// Shutdown grace period.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            cors_origins: vec!["http://localhost:3000".into()],
            max_message_size: 64 * 1024,
            send_queue_capacity: 256,
            send_timeout_ms: 1000,
            ping_interval_secs: 30,
            pong_timeout_secs: 60,
            shutdown_timeout_secs: 10,
        }
    }
}

impl From<&ServerSettings> for ServerConfig {
    fn from(s: &ServerSettings) -> Self {
        Self {
            host: s.host.clone(),
            port: s.port,
            cors_origins: s.cors_origins.clone(),
            max_message_size: s.max_message_size,
            send_queue_capacity: s.send_queue_capacity,
            send_timeout_ms: s.send_timeout_ms,
            ping_interval_secs: s.ping_interval_secs,
            pong_timeout_secs: s.pong_timeout_secs,
            shutdown_timeout_secs: s.shutdown_timeout_secs,
        }
    }
}
