//! Poll state as seen by clients.

use serde::{Deserialize, Serialize};

/// Database identifier of a poll.
pub type PollId = i64;

/// Database identifier of a poll option.
pub type OptionId = i64;

/// One option of a poll with its running vote count.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSnapshot {
    /// Option ID.
    pub id: OptionId,
    /// Display text.
    pub text: String,
    /// Number of votes cast for this option.
    pub vote_count: i64,
}

/// Full, committed state of a poll.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollSnapshot {
    /// Poll ID.
    pub id: PollId,
    /// Poll title.
    pub title: String,
    /// Optional long-form description.
    pub description: Option<String>,
    /// Display name of the creator (`"anonymous"` when not given).
    pub created_by: String,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// Number of users currently liking the poll.
    pub like_count: i64,
    /// Options in creation order.
    pub options: Vec<OptionSnapshot>,
    /// Sum of all option vote counts.
    pub total_votes: i64,
}

impl PollSnapshot {
    /// Recompute [`PollSnapshot::total_votes`] from the option counts.
    #[must_use]
    pub fn with_derived_total(mut self) -> Self {
        self.total_votes = self.options.iter().map(|o| o.vote_count).sum();
        self
    }

    /// Whether the option belongs to this poll.
    pub fn has_option(&self, option_id: OptionId) -> bool {
        self.options.iter().any(|o| o.id == option_id)
    }
}

/// A vote accepted by the poll store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    /// Vote ID.
    pub id: i64,
    /// Poll the vote was cast on.
    pub poll_id: PollId,
    /// Chosen option.
    pub option_id: OptionId,
    /// Voter identity.
    pub user_id: String,
    /// RFC 3339 timestamp of the vote.
    pub created_at: String,
}
