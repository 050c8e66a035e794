//! # quickpoll-store
//!
//! The poll store: relational state for polls, options, votes, and likes,
//! with two enforced invariants (one vote per poll and user; a vote's option
//! must belong to its poll). After each committed mutation the store hands
//! exactly one [`quickpoll_core::PollEvent`] to its
//! [`quickpoll_core::EventSink`].
//!
//! # Architecture
//!
//! - **[`sqlite`]**: pool, migrations, stateless repositories
//! - **[`store`]**: the transactional [`PollStore`] facade
//! - **[`validation`]**: request checks applied before any SQL runs

#![deny(unsafe_code)]

pub mod errors;
pub mod sqlite;
pub mod store;
pub mod types;
pub mod validation;

pub use errors::{Result, StoreError};
pub use sqlite::{ConnectionConfig, ConnectionPool, new_file, new_in_memory, run_migrations};
pub use store::PollStore;
pub use types::{ListParams, NewLike, NewOption, NewPoll, NewVote};
