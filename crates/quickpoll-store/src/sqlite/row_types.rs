//! Raw database rows.

use quickpoll_core::{OptionId, PollId};

/// A row from `polls`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollRow {
    /// Poll ID.
    pub id: PollId,
    /// Title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Creator.
    pub created_by: String,
    /// RFC 3339 timestamp.
    pub created_at: String,
    /// Current like count.
    pub like_count: i64,
}

/// A row from `options`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionRow {
    /// Option ID.
    pub id: OptionId,
    /// Owning poll.
    pub poll_id: PollId,
    /// Display text.
    pub text: String,
    /// Running vote count.
    pub vote_count: i64,
    /// Zero-based creation position.
    pub position: i64,
}
