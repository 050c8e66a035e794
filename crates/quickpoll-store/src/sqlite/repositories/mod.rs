//! Repository implementations for `SQLite` database operations.
//!
//! Each repository is a stateless struct whose methods take a `&Connection`.
//! Transactions are owned by the caller.

pub mod like;
pub mod option;
pub mod poll;
pub mod vote;

pub use like::LikeRepo;
pub use option::OptionRepo;
pub use poll::PollRepo;
pub use vote::VoteRepo;

/// Whether an error is a `UNIQUE`/constraint violation.
pub(crate) fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
