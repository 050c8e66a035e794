//! Option repository.

use quickpoll_core::{OptionId, PollId};
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::errors::Result;
use crate::sqlite::row_types::OptionRow;

/// Option repository. Stateless.
pub struct OptionRepo;

impl OptionRepo {
    /// Insert an option at `position`. Returns its ID.
    pub fn insert(conn: &Connection, poll_id: PollId, text: &str, position: i64) -> Result<OptionId> {
        let _ = conn.execute(
            "INSERT INTO options (poll_id, text, vote_count, position) VALUES (?1, ?2, 0, ?3)",
            params![poll_id, text, position],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Options of a poll in creation order.
    pub fn list_for_poll(conn: &Connection, poll_id: PollId) -> Result<Vec<OptionRow>> {
        let mut stmt = conn.prepare(
            "SELECT id, poll_id, text, vote_count, position
             FROM options WHERE poll_id = ?1 ORDER BY position, id",
        )?;
        let rows = stmt
            .query_map(params![poll_id], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Whether `option_id` is one of `poll_id`'s options.
    pub fn belongs_to(conn: &Connection, poll_id: PollId, option_id: OptionId) -> Result<bool> {
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM options WHERE id = ?1 AND poll_id = ?2",
                params![option_id, poll_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Add one vote to an option.
    pub fn increment_votes(conn: &Connection, option_id: OptionId) -> Result<()> {
        let _ = conn.execute(
            "UPDATE options SET vote_count = vote_count + 1 WHERE id = ?1",
            params![option_id],
        )?;
        Ok(())
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<OptionRow> {
        Ok(OptionRow {
            id: row.get(0)?,
            poll_id: row.get(1)?,
            text: row.get(2)?,
            vote_count: row.get(3)?,
            position: row.get(4)?,
        })
    }
}
