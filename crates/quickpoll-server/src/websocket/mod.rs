//! Real-time fan-out over WebSocket.
//!
//! - [`registry`]: live connections and poll subscriptions
//! - [`broadcast`]: event delivery with dead-connection cleanup
//! - [`connection`]: per-client outbound queue and liveness
//! - [`protocol`]: inbound `subscribe` handling
//! - [`session`]: one client's lifetime

pub mod broadcast;
pub mod connection;
pub mod protocol;
pub mod registry;
pub mod session;

pub use broadcast::Broadcaster;
pub use connection::{ClientConnection, ConnectionId};
pub use registry::SubscriptionRegistry;
