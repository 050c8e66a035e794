//! High-level `PollStore` API.
//!
//! Every mutation runs in one `IMMEDIATE` transaction on a blocking thread.
//! Only after the commit succeeds is the resulting [`PollEvent`] handed to
//! the [`EventSink`], and the call awaits that delivery before returning,
//! so events for one poll reach the sink in commit order for each caller.
//! Commit and delivery run together in a spawned task: a caller that gives
//! up mid-mutation cannot leave a committed change unpublished.
//! Rejected mutations never reach the sink.

use std::sync::Arc;

use quickpoll_core::{EventSink, LikeDelta, PollEvent, PollId, PollSnapshot, VoteRecord};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use tracing::{debug, info};

use crate::errors::{Result, StoreError};
use crate::sqlite::connection::ConnectionPool;
use crate::sqlite::now_rfc3339;
use crate::sqlite::repositories::{
    LikeRepo, OptionRepo, PollRepo, VoteRepo, is_constraint_violation,
};
use crate::types::{ANONYMOUS, ListParams, NewPoll, NewVote};
use crate::validation::{validate_new_poll, validate_user_id};

/// Poll store backed by a `SQLite` pool, publishing to an [`EventSink`].
pub struct PollStore {
    pool: ConnectionPool,
    sink: Arc<dyn EventSink>,
}

impl PollStore {
    /// Create a store over an already-migrated pool.
    pub fn new(pool: ConnectionPool, sink: Arc<dyn EventSink>) -> Self {
        Self { pool, sink }
    }

    /// Run a read on the blocking thread pool.
    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        run_blocking(self.pool.clone(), f).await
    }

    /// Run a write transaction, then publish the event it produced.
    ///
    /// Commit and publish share one spawned task, so dropping the caller's
    /// future after the commit cannot skip or truncate the delivery.
    async fn commit_then_publish<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<(T, PollEvent)> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            let (value, event) = run_blocking(pool, f).await?;
            publish(sink.as_ref(), event).await;
            Ok(value)
        })
        .await
        .map_err(|e| StoreError::Internal(format!("mutation task failed: {e}")))?
    }

    // ─────────────────────────────────────────────────────────────────────
    // Polls
    // ─────────────────────────────────────────────────────────────────────

    /// Create a poll with its options. Publishes `poll_created`.
    pub async fn create_poll(&self, new: NewPoll) -> Result<PollSnapshot> {
        validate_new_poll(&new)?;

        self.commit_then_publish(move |conn| {
            let tx = write_tx(conn)?;
            let created_by = new
                .created_by
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(ANONYMOUS);
            let id = PollRepo::insert(
                &tx,
                &new.title,
                new.description.as_deref(),
                created_by,
                &now_rfc3339(),
            )?;
            for (position, option) in (0_i64..).zip(&new.options) {
                let _ = OptionRepo::insert(&tx, id, &option.text, position)?;
            }
            let snapshot = PollRepo::snapshot(&tx, id)?
                .ok_or_else(|| StoreError::Internal(format!("poll {id} vanished after insert")))?;
            tx.commit()?;
            info!(poll_id = id, options = snapshot.options.len(), "poll created");
            Ok((snapshot.clone(), PollEvent::PollCreated(snapshot)))
        })
        .await
    }

    /// List polls, newest first.
    pub async fn list_polls(&self, params: ListParams) -> Result<Vec<PollSnapshot>> {
        let limit = params.clamped_limit();
        let skip = params.skip;
        self.blocking(move |conn| PollRepo::list_snapshots(conn, skip, limit))
            .await
    }

    /// Get one poll.
    pub async fn get_poll(&self, poll_id: PollId) -> Result<PollSnapshot> {
        self.blocking(move |conn| {
            PollRepo::snapshot(conn, poll_id)?.ok_or(StoreError::PollNotFound(poll_id))
        })
        .await
    }

    /// Delete a poll and everything attached to it. Publishes nothing.
    pub async fn delete_poll(&self, poll_id: PollId) -> Result<()> {
        self.blocking(move |conn| {
            if PollRepo::delete(conn, poll_id)? {
                Ok(())
            } else {
                Err(StoreError::PollNotFound(poll_id))
            }
        })
        .await?;
        info!(poll_id, "poll deleted");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Votes
    // ─────────────────────────────────────────────────────────────────────

    /// Cast a vote. Publishes `vote` with the refreshed snapshot.
    ///
    /// Checks run in order: poll exists, user has not voted, option belongs
    /// to the poll.
    pub async fn cast_vote(&self, poll_id: PollId, vote: NewVote) -> Result<VoteRecord> {
        validate_user_id(&vote.user_id)?;

        self.commit_then_publish(move |conn| {
            let tx = write_tx(conn)?;
            if !PollRepo::exists(&tx, poll_id)? {
                return Err(StoreError::PollNotFound(poll_id));
            }
            let duplicate = || StoreError::DuplicateVote {
                poll_id,
                user_id: vote.user_id.clone(),
            };
            if VoteRepo::get_for_user(&tx, poll_id, &vote.user_id)?.is_some() {
                return Err(duplicate());
            }
            if !OptionRepo::belongs_to(&tx, poll_id, vote.option_id)? {
                return Err(StoreError::OptionNotInPoll {
                    poll_id,
                    option_id: vote.option_id,
                });
            }

            let record = VoteRepo::insert(
                &tx,
                poll_id,
                vote.option_id,
                &vote.user_id,
                &now_rfc3339(),
            )
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    duplicate()
                } else {
                    StoreError::Sqlite(e)
                }
            })?;
            OptionRepo::increment_votes(&tx, vote.option_id)?;
            let snapshot =
                PollRepo::snapshot(&tx, poll_id)?.ok_or(StoreError::PollNotFound(poll_id))?;
            tx.commit()?;
            info!(poll_id, option_id = record.option_id, "vote recorded");
            Ok((record, PollEvent::Vote(snapshot)))
        })
        .await
    }

    /// The user's vote on a poll, if any.
    pub async fn get_user_vote(&self, poll_id: PollId, user_id: &str) -> Result<Option<VoteRecord>> {
        let user_id = user_id.to_string();
        self.blocking(move |conn| VoteRepo::get_for_user(conn, poll_id, &user_id))
            .await
    }

    // ─────────────────────────────────────────────────────────────────────
    // Likes
    // ─────────────────────────────────────────────────────────────────────

    /// Toggle the user's like. Publishes `like` with the delta.
    pub async fn toggle_like(&self, poll_id: PollId, user_id: &str) -> Result<LikeDelta> {
        validate_user_id(user_id)?;
        let user_id = user_id.to_string();

        self.commit_then_publish(move |conn| {
            let tx = write_tx(conn)?;
            if !PollRepo::exists(&tx, poll_id)? {
                return Err(StoreError::PollNotFound(poll_id));
            }
            let is_liked = if LikeRepo::delete(&tx, poll_id, &user_id)? {
                false
            } else {
                LikeRepo::insert(&tx, poll_id, &user_id, &now_rfc3339())?;
                true
            };
            let like_count = PollRepo::adjust_likes(&tx, poll_id, if is_liked { 1 } else { -1 })?;
            tx.commit()?;
            info!(poll_id, is_liked, like_count, "like toggled");
            let delta = LikeDelta {
                is_liked,
                like_count,
            };
            Ok((delta, PollEvent::Like { poll_id, delta }))
        })
        .await
    }

    /// Whether the user currently likes the poll.
    pub async fn get_user_like(&self, poll_id: PollId, user_id: &str) -> Result<bool> {
        let user_id = user_id.to_string();
        self.blocking(move |conn| LikeRepo::exists(conn, poll_id, &user_id))
            .await
    }
}

/// Run `f` with a pooled connection on the blocking thread pool.
async fn run_blocking<T, F>(pool: ConnectionPool, f: F) -> Result<T>
where
    F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let conn = pool.get()?;
        f(&conn)
    })
    .await
    .map_err(|e| StoreError::Internal(format!("blocking task failed: {e}")))?
}

async fn publish(sink: &dyn EventSink, event: PollEvent) {
    let kind = event.kind();
    let poll_id = event.subject();
    let report = sink.deliver(event).await;
    debug!(
        event_type = %kind,
        poll_id,
        recipients = report.recipients,
        delivered = report.delivered,
        failed = report.failed,
        "event published"
    );
}

/// Begin a write transaction that takes the database write lock up front.
fn write_tx(conn: &Connection) -> rusqlite::Result<Transaction<'_>> {
    Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use quickpoll_core::{DeliveryReport, EventKind};

    use super::*;
    use crate::sqlite::{ConnectionConfig, new_in_memory, run_migrations};
    use crate::types::NewOption;

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<PollEvent>>,
    }

    impl RecordingSink {
        fn take(&self) -> Vec<PollEvent> {
            std::mem::take(&mut *self.events.lock())
        }
    }

    #[async_trait]
    impl EventSink for RecordingSink {
        async fn deliver(&self, event: PollEvent) -> DeliveryReport {
            self.events.lock().push(event);
            DeliveryReport::default()
        }
    }

    fn setup() -> (PollStore, Arc<RecordingSink>) {
        let pool = new_in_memory(&ConnectionConfig::default()).unwrap();
        {
            let conn = pool.get().unwrap();
            let _ = run_migrations(&conn).unwrap();
        }
        let sink = Arc::new(RecordingSink::default());
        (PollStore::new(pool, sink.clone()), sink)
    }

    fn new_poll(title: &str) -> NewPoll {
        NewPoll {
            title: title.into(),
            description: Some("desc".into()),
            created_by: None,
            options: vec![
                NewOption { text: "yes".into() },
                NewOption { text: "no".into() },
            ],
        }
    }

    /// Poll `fut` exactly once, then drop it.
    async fn poll_once_and_drop<F: std::future::Future>(fut: F) {
        let _ = tokio::time::timeout(std::time::Duration::ZERO, fut).await;
    }

    /// Wait until the sink holds at least `n` events.
    async fn wait_for_events(sink: &RecordingSink, n: usize) {
        tokio::time::timeout(std::time::Duration::from_secs(5), async {
            while sink.events.lock().len() < n {
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("expected {n} events, have {}", sink.events.lock().len()));
    }

    fn vote(option_id: i64, user: &str) -> NewVote {
        NewVote {
            option_id,
            user_id: user.into(),
        }
    }

    #[tokio::test]
    async fn create_poll_zeroes_counts_and_publishes_globally() {
        let (store, sink) = setup();
        let poll = store.create_poll(new_poll("Lunch?")).await.unwrap();

        assert_eq!(poll.created_by, "anonymous");
        assert_eq!(poll.like_count, 0);
        assert_eq!(poll.total_votes, 0);
        assert_eq!(poll.options.len(), 2);
        assert!(poll.options.iter().all(|o| o.vote_count == 0));

        let events = sink.take();
        assert_eq!(events, vec![PollEvent::PollCreated(poll)]);
        assert_eq!(events[0].target(), None);
    }

    #[tokio::test]
    async fn invalid_poll_is_rejected_without_event() {
        let (store, sink) = setup();
        let mut bad = new_poll("t");
        bad.options.truncate(1);
        assert_matches!(
            store.create_poll(bad).await,
            Err(StoreError::Validation { field: "options", .. })
        );
        assert!(sink.take().is_empty());
        assert!(store.list_polls(ListParams::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let (store, _sink) = setup();
        let a = store.create_poll(new_poll("a")).await.unwrap();
        let b = store.create_poll(new_poll("b")).await.unwrap();

        let ids: Vec<_> = store
            .list_polls(ListParams::default())
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![b.id, a.id]);

        let page = store
            .list_polls(ListParams { skip: 1, limit: 0 })
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, a.id);
    }

    #[tokio::test]
    async fn vote_updates_snapshot_and_publishes_to_poll() {
        let (store, sink) = setup();
        let poll = store.create_poll(new_poll("p")).await.unwrap();
        let _ = sink.take();

        let option = poll.options[1].id;
        let record = store.cast_vote(poll.id, vote(option, "u1")).await.unwrap();
        assert_eq!(record.poll_id, poll.id);
        assert_eq!(record.option_id, option);

        let events = sink.take();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), EventKind::Vote);
        assert_eq!(events[0].target(), Some(poll.id));
        let PollEvent::Vote(snapshot) = &events[0] else {
            panic!("expected vote event");
        };
        assert_eq!(snapshot.options[1].vote_count, 1);
        assert_eq!(snapshot.total_votes, 1);

        assert_eq!(
            store.get_user_vote(poll.id, "u1").await.unwrap(),
            Some(record)
        );
        assert_eq!(store.get_user_vote(poll.id, "u2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn vote_rejections_publish_nothing() {
        let (store, sink) = setup();
        let poll = store.create_poll(new_poll("p")).await.unwrap();
        let other = store.create_poll(new_poll("q")).await.unwrap();
        let option = poll.options[0].id;
        let _ = store.cast_vote(poll.id, vote(option, "u1")).await.unwrap();
        let _ = sink.take();

        assert_matches!(
            store.cast_vote(poll.id, vote(option, "u1")).await,
            Err(StoreError::DuplicateVote { .. })
        );
        assert_matches!(
            store.cast_vote(poll.id, vote(other.options[0].id, "u2")).await,
            Err(StoreError::OptionNotInPoll { .. })
        );
        assert_matches!(
            store.cast_vote(9999, vote(option, "u3")).await,
            Err(StoreError::PollNotFound(9999))
        );
        assert_matches!(
            store.cast_vote(poll.id, vote(option, "")).await,
            Err(StoreError::Validation { field: "user_id", .. })
        );
        assert!(sink.take().is_empty());

        let snapshot = store.get_poll(poll.id).await.unwrap();
        assert_eq!(snapshot.total_votes, 1);
    }

    #[tokio::test]
    async fn duplicate_check_precedes_option_check() {
        let (store, _sink) = setup();
        let poll = store.create_poll(new_poll("p")).await.unwrap();
        let _ = store
            .cast_vote(poll.id, vote(poll.options[0].id, "u1"))
            .await
            .unwrap();
        assert_matches!(
            store.cast_vote(poll.id, vote(-1, "u1")).await,
            Err(StoreError::DuplicateVote { .. })
        );
    }

    #[tokio::test]
    async fn like_toggles_with_running_count() {
        let (store, sink) = setup();
        let poll = store.create_poll(new_poll("p")).await.unwrap();
        let _ = sink.take();

        let first = store.toggle_like(poll.id, "u1").await.unwrap();
        assert_eq!(first, LikeDelta { is_liked: true, like_count: 1 });
        assert!(store.get_user_like(poll.id, "u1").await.unwrap());

        let second = store.toggle_like(poll.id, "u1").await.unwrap();
        assert_eq!(second, LikeDelta { is_liked: false, like_count: 0 });
        assert!(!store.get_user_like(poll.id, "u1").await.unwrap());

        assert_eq!(
            sink.take(),
            vec![
                PollEvent::Like { poll_id: poll.id, delta: first },
                PollEvent::Like { poll_id: poll.id, delta: second },
            ]
        );
    }

    #[tokio::test]
    async fn like_counts_distinct_users() {
        let (store, _sink) = setup();
        let poll = store.create_poll(new_poll("p")).await.unwrap();
        let _ = store.toggle_like(poll.id, "a").await.unwrap();
        let delta = store.toggle_like(poll.id, "b").await.unwrap();
        assert_eq!(delta.like_count, 2);
        assert_eq!(store.get_poll(poll.id).await.unwrap().like_count, 2);
    }

    #[tokio::test]
    async fn like_on_missing_poll_is_rejected() {
        let (store, sink) = setup();
        assert_matches!(
            store.toggle_like(42, "u1").await,
            Err(StoreError::PollNotFound(42))
        );
        assert!(sink.take().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_poll_without_event() {
        let (store, sink) = setup();
        let poll = store.create_poll(new_poll("p")).await.unwrap();
        let _ = store
            .cast_vote(poll.id, vote(poll.options[0].id, "u1"))
            .await
            .unwrap();
        let _ = sink.take();

        store.delete_poll(poll.id).await.unwrap();
        assert!(sink.take().is_empty());
        assert_matches!(
            store.get_poll(poll.id).await,
            Err(StoreError::PollNotFound(_))
        );
        assert_matches!(
            store.delete_poll(poll.id).await,
            Err(StoreError::PollNotFound(_))
        );
        assert_eq!(store.get_user_vote(poll.id, "u1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_backed_store_persists_across_pools() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("polls.db");
        let path = path.to_str().unwrap();
        let config = ConnectionConfig::default();

        let id = {
            let pool = crate::sqlite::new_file(path, &config).unwrap();
            let _ = run_migrations(&pool.get().unwrap()).unwrap();
            let store = PollStore::new(pool, Arc::new(RecordingSink::default()));
            store.create_poll(new_poll("durable")).await.unwrap().id
        };

        let pool = crate::sqlite::new_file(path, &config).unwrap();
        let store = PollStore::new(pool, Arc::new(RecordingSink::default()));
        assert_eq!(store.get_poll(id).await.unwrap().title, "durable");
    }

    #[tokio::test]
    async fn dropped_vote_call_still_publishes_after_commit() {
        let (store, sink) = setup();
        let poll = store.create_poll(new_poll("Lunch?")).await.unwrap();
        let _ = sink.take();

        poll_once_and_drop(store.cast_vote(poll.id, vote(poll.options[0].id, "u1"))).await;
        wait_for_events(&sink, 1).await;
        // give a duplicate publish a chance to show up
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let committed = store.get_poll(poll.id).await.unwrap();
        assert_eq!(committed.total_votes, 1);
        assert_eq!(sink.take(), vec![PollEvent::Vote(committed)]);
    }

    #[tokio::test]
    async fn dropped_like_call_still_publishes_after_commit() {
        let (store, sink) = setup();
        let poll = store.create_poll(new_poll("Lunch?")).await.unwrap();
        let _ = sink.take();

        poll_once_and_drop(store.toggle_like(poll.id, "u1")).await;
        wait_for_events(&sink, 1).await;

        assert!(store.get_user_like(poll.id, "u1").await.unwrap());
        assert_eq!(
            sink.take(),
            vec![PollEvent::Like {
                poll_id: poll.id,
                delta: LikeDelta { is_liked: true, like_count: 1 },
            }]
        );
    }

    #[tokio::test]
    async fn dropped_create_call_still_publishes_after_commit() {
        let (store, sink) = setup();

        poll_once_and_drop(store.create_poll(new_poll("Lunch?"))).await;
        wait_for_events(&sink, 1).await;

        let polls = store.list_polls(ListParams::default()).await.unwrap();
        assert_eq!(polls.len(), 1);
        assert_eq!(sink.take(), vec![PollEvent::PollCreated(polls[0].clone())]);
    }
}
