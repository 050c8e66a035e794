//! Error types for the poll store.
//!
//! Rejections of a mutation ([`StoreError::PollNotFound`],
//! [`StoreError::DuplicateVote`], [`StoreError::OptionNotInPoll`],
//! [`StoreError::Validation`]) are ordinary outcomes that callers map to
//! client errors. Everything else is an infrastructure failure.

use quickpoll_core::{OptionId, PollId};
use thiserror::Error;

/// Errors that can occur during poll store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `SQLite` database error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Schema migration failed.
    #[error("migration error: {message}")]
    Migration {
        /// Which migration failed and why.
        message: String,
    },

    /// No poll with this ID.
    #[error("poll not found: {0}")]
    PollNotFound(PollId),

    /// The user already voted on this poll.
    #[error("user {user_id} has already voted on poll {poll_id}")]
    DuplicateVote {
        /// Poll voted on.
        poll_id: PollId,
        /// Voter.
        user_id: String,
    },

    /// The option does not belong to the poll.
    #[error("option {option_id} does not belong to poll {poll_id}")]
    OptionNotInPoll {
        /// Poll voted on.
        poll_id: PollId,
        /// Rejected option.
        option_id: OptionId,
    },

    /// Request input failed validation.
    #[error("invalid {field}: {message}")]
    Validation {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// Internal error (e.g. a blocking task panicked).
    #[error("internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Shorthand for a [`StoreError::Validation`].
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Whether this error is a rejected mutation rather than a failure.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::PollNotFound(_)
                | Self::DuplicateVote { .. }
                | Self::OptionNotInPoll { .. }
                | Self::Validation { .. }
        )
    }
}

/// Convenience type alias for poll store results.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_error_display() {
        let err = StoreError::Sqlite(rusqlite::Error::QueryReturnedNoRows);
        assert!(err.to_string().contains("sqlite error"));
        assert!(!err.is_rejection());
    }

    #[test]
    fn duplicate_vote_display() {
        let err = StoreError::DuplicateVote {
            poll_id: 3,
            user_id: "u1".into(),
        };
        assert_eq!(err.to_string(), "user u1 has already voted on poll 3");
        assert!(err.is_rejection());
    }

    #[test]
    fn validation_display() {
        let err = StoreError::validation("title", "must not be empty");
        assert_eq!(err.to_string(), "invalid title: must not be empty");
        assert!(err.is_rejection());
    }

    #[test]
    fn poll_not_found_is_rejection() {
        assert!(StoreError::PollNotFound(1).is_rejection());
        assert!(!StoreError::Internal("boom".into()).is_rejection());
    }
}
