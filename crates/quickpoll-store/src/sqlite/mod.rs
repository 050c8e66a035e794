//! `SQLite` backend for the poll store.
//!
//! - **[`connection`]**: `r2d2` pool with WAL and foreign keys on every connection.
//! - **[`migrations`]**: embedded, version-tracked schema.
//! - **[`row_types`]**: raw row structs.
//! - **[`repositories`]**: stateless repositories; every method takes `&Connection`.

pub mod connection;
pub mod migrations;
pub mod repositories;
pub mod row_types;

pub use connection::{
    ConnectionConfig, ConnectionPool, PooledConnection, PragmaState, new_file, new_in_memory,
    verify_pragmas,
};
pub use migrations::{current_version, latest_version, run_migrations};

/// Current UTC time as an RFC 3339 string with millisecond precision.
pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
