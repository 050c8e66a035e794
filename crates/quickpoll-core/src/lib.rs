//! # quickpoll-core
//!
//! Shared domain types for the `QuickPoll` server.
//!
//! - **Polls**: [`PollSnapshot`], [`OptionSnapshot`], [`VoteRecord`]
//! - **Events**: [`PollEvent`] and its outbound wire envelope
//! - **Sink**: the [`EventSink`] seam the poll store uses to hand committed
//!   events to the real-time fan-out layer
//! - **Logging**: `tracing` subscriber setup shared by every binary

#![deny(unsafe_code)]

pub mod events;
pub mod logging;
pub mod polls;
pub mod sink;

pub use events::{EventKind, LikeDelta, Notification, NotificationData, PollEvent};
pub use polls::{OptionId, OptionSnapshot, PollId, PollSnapshot, VoteRecord};
pub use sink::{DeliveryReport, EventSink};
