//! Request payloads accepted by the poll store.

use serde::Deserialize;

use quickpoll_core::OptionId;

/// Creator name used when none is given.
pub const ANONYMOUS: &str = "anonymous";

/// A poll to create.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct NewPoll {
    /// Title, 1 to 200 characters.
    pub title: String,
    /// Optional description, at most 1000 characters.
    #[serde(default)]
    pub description: Option<String>,
    /// Creator display name.
    #[serde(default)]
    pub created_by: Option<String>,
    /// Between 2 and 10 options.
    pub options: Vec<NewOption>,
}

/// One option of a [`NewPoll`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct NewOption {
    /// Display text, 1 to 200 characters.
    pub text: String,
}

/// A vote to cast.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct NewVote {
    /// Chosen option.
    pub option_id: OptionId,
    /// Voter identity.
    pub user_id: String,
}

/// A like toggle request.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct NewLike {
    /// User toggling the like.
    pub user_id: String,
}

/// Paging for poll listings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ListParams {
    /// Rows to skip.
    pub skip: u32,
    /// Maximum rows, clamped to `1..=100`.
    pub limit: u32,
}

impl ListParams {
    /// Largest accepted page size.
    pub const MAX_LIMIT: u32 = 100;

    /// Page size clamped into the accepted range.
    pub fn clamped_limit(&self) -> u32 {
        self.limit.clamp(1, Self::MAX_LIMIT)
    }
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: Self::MAX_LIMIT,
        }
    }
}
