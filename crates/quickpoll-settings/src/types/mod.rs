//! Settings type definitions.
//!
//! Field names are camelCase in JSON. Every section implements [`Default`]
//! with production values and is marked `#[serde(default)]`, so a partial
//! settings file only needs the keys it changes.

mod database;
mod server;

pub use database::*;
pub use server::*;

use serde::{Deserialize, Serialize};

/// Root settings type for the `QuickPoll` server.
///
/// ```json
/// {
///   "server": { "port": 9000, "corsOrigins": ["https://polls.example"] },
///   "database": { "path": "/var/lib/quickpoll/quickpoll.db" },
///   "logging": { "level": "debug" }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuickPollSettings {
    /// HTTP and WebSocket server settings.
    pub server: ServerSettings,
    /// SQLite storage settings.
    pub database: DatabaseSettings,
    /// Log output settings.
    pub logging: LoggingSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = QuickPollSettings::default();
        assert_eq!(s.server.host, "0.0.0.0");
        assert_eq!(s.server.port, 8000);
        assert_eq!(s.server.cors_origins, vec!["http://localhost:3000".to_string()]);
        assert_eq!(s.server.send_timeout_ms, 1000);
        assert_eq!(s.database.path, "quickpoll.db");
        assert_eq!(s.database.pool_size, 8);
        assert_eq!(s.logging.level, "info");
        assert!(!s.logging.json);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(QuickPollSettings::default()).unwrap();
        assert!(json["server"]["corsOrigins"].is_array());
        assert!(json["server"]["sendQueueCapacity"].is_u64());
        assert!(json["database"]["busyTimeoutMs"].is_u64());
        assert!(json["server"].get("cors_origins").is_none());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let s: QuickPollSettings =
            serde_json::from_str(r#"{"server": {"port": 9100}}"#).unwrap();
        assert_eq!(s.server.port, 9100);
        assert_eq!(s.server.host, "0.0.0.0");
        assert_eq!(s.database, DatabaseSettings::default());
    }
}
