//! Vote repository.

use quickpoll_core::{OptionId, PollId, VoteRecord};
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::errors::Result;

/// Vote repository. Stateless.
pub struct VoteRepo;

impl VoteRepo {
    /// Insert a vote. Fails with a constraint violation if the user already voted on the poll.
    pub fn insert(
        conn: &Connection,
        poll_id: PollId,
        option_id: OptionId,
        user_id: &str,
        created_at: &str,
    ) -> rusqlite::Result<VoteRecord> {
        let _ = conn.execute(
            "INSERT INTO votes (poll_id, option_id, user_id, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![poll_id, option_id, user_id, created_at],
        )?;
        Ok(VoteRecord {
            id: conn.last_insert_rowid(),
            poll_id,
            option_id,
            user_id: user_id.to_string(),
            created_at: created_at.to_string(),
        })
    }

    /// The user's vote on a poll, if any.
    pub fn get_for_user(conn: &Connection, poll_id: PollId, user_id: &str) -> Result<Option<VoteRecord>> {
        let row = conn
            .query_row(
                "SELECT id, poll_id, option_id, user_id, created_at
                 FROM votes WHERE poll_id = ?1 AND user_id = ?2",
                params![poll_id, user_id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<VoteRecord> {
        Ok(VoteRecord {
            id: row.get(0)?,
            poll_id: row.get(1)?,
            option_id: row.get(2)?,
            user_id: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}
