//! Like repository.

use quickpoll_core::PollId;
use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::Result;

/// Like repository. Stateless.
pub struct LikeRepo;

impl LikeRepo {
    /// Whether the user currently likes the poll.
    pub fn exists(conn: &Connection, poll_id: PollId, user_id: &str) -> Result<bool> {
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM likes WHERE poll_id = ?1 AND user_id = ?2",
                params![poll_id, user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Record a like.
    pub fn insert(conn: &Connection, poll_id: PollId, user_id: &str, created_at: &str) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO likes (poll_id, user_id, created_at) VALUES (?1, ?2, ?3)",
            params![poll_id, user_id, created_at],
        )?;
        Ok(())
    }

    /// Remove a like. Returns whether one existed.
    pub fn delete(conn: &Connection, poll_id: PollId, user_id: &str) -> Result<bool> {
        let changed = conn.execute(
            "DELETE FROM likes WHERE poll_id = ?1 AND user_id = ?2",
            params![poll_id, user_id],
        )?;
        Ok(changed > 0)
    }
}
