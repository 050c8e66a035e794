//! # quickpoll-server
//!
//! Axum HTTP + WebSocket server for `QuickPoll`.
//!
//! - **HTTP**: poll, vote, and like routes over the poll store
//! - **WebSocket**: per-poll subscriptions with real-time fan-out of
//!   committed poll events
//! - **Ops**: health, Prometheus metrics, graceful shutdown

#![deny(unsafe_code)]

pub mod config;
pub mod health;
pub mod http;
pub mod metrics;
pub mod server;
pub mod shutdown;
pub mod websocket;
