//! Input validation for poll store requests.
//!
//! Lengths are counted in characters, not bytes.

use crate::errors::{Result, StoreError};
use crate::types::NewPoll;

/// Longest accepted poll title.
pub const MAX_TITLE_LEN: usize = 200;
/// Longest accepted poll description.
pub const MAX_DESCRIPTION_LEN: usize = 1000;
/// Longest accepted option text.
pub const MAX_OPTION_LEN: usize = 200;
/// Fewest options a poll may have.
pub const MIN_OPTIONS: usize = 2;
/// Most options a poll may have.
pub const MAX_OPTIONS: usize = 10;

fn check_text(field: &'static str, value: &str, max: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StoreError::validation(field, "must not be empty"));
    }
    if value.chars().count() > max {
        return Err(StoreError::validation(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

/// Validate a poll creation request.
pub fn validate_new_poll(poll: &NewPoll) -> Result<()> {
    check_text("title", &poll.title, MAX_TITLE_LEN)?;

    if let Some(description) = &poll.description {
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(StoreError::validation(
                "description",
                format!("must be at most {MAX_DESCRIPTION_LEN} characters"),
            ));
        }
    }

    let n = poll.options.len();
    if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&n) {
        return Err(StoreError::validation(
            "options",
            format!("must have between {MIN_OPTIONS} and {MAX_OPTIONS} entries, got {n}"),
        ));
    }
    for option in &poll.options {
        check_text("options.text", &option.text, MAX_OPTION_LEN)?;
    }
    Ok(())
}

/// Validate a voter or liker identity.
pub fn validate_user_id(user_id: &str) -> Result<()> {
    if user_id.trim().is_empty() {
        return Err(StoreError::validation("user_id", "must not be empty"));
    }
    Ok(())
}
