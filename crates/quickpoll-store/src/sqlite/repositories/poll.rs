//! Poll repository: the `polls` table plus snapshot assembly.

use quickpoll_core::{OptionSnapshot, PollId, PollSnapshot};
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::errors::Result;
use crate::sqlite::repositories::option::OptionRepo;
use crate::sqlite::row_types::{OptionRow, PollRow};

const COLUMNS: &str = "id, title, description, created_by, created_at, like_count";

/// Poll repository. Stateless.
pub struct PollRepo;

impl PollRepo {
    /// Insert a poll with zero likes. Returns its ID.
    pub fn insert(
        conn: &Connection,
        title: &str,
        description: Option<&str>,
        created_by: &str,
        created_at: &str,
    ) -> Result<PollId> {
        let _ = conn.execute(
            "INSERT INTO polls (title, description, created_by, created_at, like_count)
             VALUES (?1, ?2, ?3, ?4, 0)",
            params![title, description, created_by, created_at],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Get a poll row by ID.
    pub fn get(conn: &Connection, id: PollId) -> Result<Option<PollRow>> {
        let row = conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM polls WHERE id = ?1"),
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Whether a poll exists.
    pub fn exists(conn: &Connection, id: PollId) -> Result<bool> {
        let found: Option<i64> = conn
            .query_row("SELECT 1 FROM polls WHERE id = ?1", params![id], |row| row.get(0))
            .optional()?;
        Ok(found.is_some())
    }

    /// List poll rows, newest first.
    pub fn list(conn: &Connection, skip: u32, limit: u32) -> Result<Vec<PollRow>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM polls
             ORDER BY created_at DESC, id DESC
             LIMIT ?1 OFFSET ?2"
        ))?;
        let rows = stmt
            .query_map(params![limit, skip], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Delete a poll. Options, votes, and likes cascade. Returns whether a row was removed.
    pub fn delete(conn: &Connection, id: PollId) -> Result<bool> {
        let changed = conn.execute("DELETE FROM polls WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    /// Add `delta` to the like count, clamping at zero. Returns the new count.
    pub fn adjust_likes(conn: &Connection, id: PollId, delta: i64) -> Result<i64> {
        let count = conn.query_row(
            "UPDATE polls SET like_count = MAX(0, like_count + ?2) WHERE id = ?1
             RETURNING like_count",
            params![id, delta],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Assemble the full snapshot of a poll, or `None` if it does not exist.
    pub fn snapshot(conn: &Connection, id: PollId) -> Result<Option<PollSnapshot>> {
        let Some(poll) = Self::get(conn, id)? else {
            return Ok(None);
        };
        let options = OptionRepo::list_for_poll(conn, id)?;
        Ok(Some(Self::assemble(poll, options)))
    }

    /// List snapshots, newest first.
    pub fn list_snapshots(conn: &Connection, skip: u32, limit: u32) -> Result<Vec<PollSnapshot>> {
        Self::list(conn, skip, limit)?
            .into_iter()
            .map(|poll| {
                let options = OptionRepo::list_for_poll(conn, poll.id)?;
                Ok(Self::assemble(poll, options))
            })
            .collect()
    }

    fn assemble(poll: PollRow, options: Vec<OptionRow>) -> PollSnapshot {
        PollSnapshot {
            id: poll.id,
            title: poll.title,
            description: poll.description,
            created_by: poll.created_by,
            created_at: poll.created_at,
            like_count: poll.like_count,
            options: options
                .into_iter()
                .map(|o| OptionSnapshot {
                    id: o.id,
                    text: o.text,
                    vote_count: o.vote_count,
                })
                .collect(),
            total_votes: 0,
        }
        .with_derived_total()
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<PollRow> {
        Ok(PollRow {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            created_by: row.get(3)?,
            created_at: row.get(4)?,
            like_count: row.get(5)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::run_migrations;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        let _ = run_migrations(&conn).unwrap();
        conn
    }

    fn insert(conn: &Connection, title: &str, at: &str) -> PollId {
        PollRepo::insert(conn, title, None, "anonymous", at).unwrap()
    }

    #[test]
    fn insert_and_get() {
        let conn = setup();
        let id = PollRepo::insert(&conn, "Lunch", Some("today"), "bob", "2026-01-01T00:00:00.000Z")
            .unwrap();
        let row = PollRepo::get(&conn, id).unwrap().unwrap();
        assert_eq!(row.title, "Lunch");
        assert_eq!(row.description.as_deref(), Some("today"));
        assert_eq!(row.created_by, "bob");
        assert_eq!(row.like_count, 0);
        assert!(PollRepo::exists(&conn, id).unwrap());
        assert!(!PollRepo::exists(&conn, id + 1).unwrap());
    }

    #[test]
    fn list_newest_first_with_paging() {
        let conn = setup();
        let a = insert(&conn, "a", "2026-01-01T00:00:00.000Z");
        let b = insert(&conn, "b", "2026-01-02T00:00:00.000Z");
        let c = insert(&conn, "c", "2026-01-03T00:00:00.000Z");

        let ids: Vec<_> = PollRepo::list(&conn, 0, 100).unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![c, b, a]);

        let ids: Vec<_> = PollRepo::list(&conn, 1, 1).unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![b]);
    }

    #[test]
    fn adjust_likes_clamps_at_zero() {
        let conn = setup();
        let id = insert(&conn, "a", "2026-01-01T00:00:00.000Z");
        assert_eq!(PollRepo::adjust_likes(&conn, id, 1).unwrap(), 1);
        assert_eq!(PollRepo::adjust_likes(&conn, id, -1).unwrap(), 0);
        assert_eq!(PollRepo::adjust_likes(&conn, id, -1).unwrap(), 0);
    }

    #[test]
    fn delete_cascades_options() {
        let conn = setup();
        let id = insert(&conn, "a", "2026-01-01T00:00:00.000Z");
        let _ = OptionRepo::insert(&conn, id, "x", 0).unwrap();
        assert!(PollRepo::delete(&conn, id).unwrap());
        assert!(!PollRepo::delete(&conn, id).unwrap());
        assert!(OptionRepo::list_for_poll(&conn, id).unwrap().is_empty());
    }

    #[test]
    fn snapshot_orders_options_and_totals_votes() {
        let conn = setup();
        let id = insert(&conn, "a", "2026-01-01T00:00:00.000Z");
        let first = OptionRepo::insert(&conn, id, "first", 0).unwrap();
        let second = OptionRepo::insert(&conn, id, "second", 1).unwrap();
        OptionRepo::increment_votes(&conn, second).unwrap();
        OptionRepo::increment_votes(&conn, second).unwrap();
        OptionRepo::increment_votes(&conn, first).unwrap();

        let snap = PollRepo::snapshot(&conn, id).unwrap().unwrap();
        let texts: Vec<_> = snap.options.iter().map(|o| o.text.as_str()).collect();
        assert_eq!(texts, ["first", "second"]);
        assert_eq!(snap.options[1].vote_count, 2);
        assert_eq!(snap.total_votes, 3);
        assert!(PollRepo::snapshot(&conn, id + 1).unwrap().is_none());
    }
}
