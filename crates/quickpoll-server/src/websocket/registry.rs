//! Subscription registry: which connections are live and which polls each
//! one follows.
//!
//! All state sits behind one mutex. Every operation takes the lock, does
//! pure bookkeeping, and releases it; nothing here awaits. Resolution
//! returns an owned snapshot so callers can send without holding the lock
//! and can unregister recipients mid-broadcast.
//!
//! The registry never owns a connection. It keeps a `Weak` back-reference
//! per live ID; a reference that no longer upgrades is skipped on resolve
//! and cleaned up when its session unregisters.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use quickpoll_core::PollId;

use super::connection::{ClientConnection, ConnectionId};

#[derive(Default)]
struct RegistryInner {
    live: HashMap<ConnectionId, Weak<ClientConnection>>,
    subscribers: HashMap<PollId, HashSet<ConnectionId>>,
    interests: HashMap<ConnectionId, HashSet<PollId>>,
}

/// Tracks live connections and their poll subscriptions.
#[derive(Default)]
pub struct SubscriptionRegistry {
    inner: Mutex<RegistryInner>,
}

impl SubscriptionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to the live set. Registering twice keeps one entry.
    pub fn register(&self, connection: &Arc<ClientConnection>) {
        let mut inner = self.inner.lock();
        let _ = inner
            .live
            .insert(connection.id.clone(), Arc::downgrade(connection));
    }

    /// Subscribe a live connection to a poll.
    ///
    /// Returns `false` (and does nothing) if the connection is not
    /// registered. Poll existence is not checked.
    pub fn subscribe(&self, id: &ConnectionId, poll_id: PollId) -> bool {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        if !inner.live.contains_key(id) {
            return false;
        }
        let _ = inner
            .subscribers
            .entry(poll_id)
            .or_default()
            .insert(id.clone());
        let _ = inner.interests.entry(id.clone()).or_default().insert(poll_id);
        true
    }

    /// Remove a connection from the live set and from every poll it
    /// followed. Polls left without subscribers are dropped.
    ///
    /// Returns whether the connection was registered.
    pub fn unregister(&self, id: &ConnectionId) -> bool {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let was_live = inner.live.remove(id).is_some();
        for poll_id in inner.interests.remove(id).unwrap_or_default() {
            let now_empty = inner.subscribers.get_mut(&poll_id).is_some_and(|set| {
                let _ = set.remove(id);
                set.is_empty()
            });
            if now_empty {
                let _ = inner.subscribers.remove(&poll_id);
            }
        }
        was_live
    }

    /// Snapshot of every live connection.
    pub fn resolve_global(&self) -> Vec<Arc<ClientConnection>> {
        let inner = self.inner.lock();
        inner.live.values().filter_map(Weak::upgrade).collect()
    }

    /// Snapshot of a poll's subscribers. Empty if the poll has none.
    pub fn resolve_poll(&self, poll_id: PollId) -> Vec<Arc<ClientConnection>> {
        let inner = self.inner.lock();
        let Some(ids) = inner.subscribers.get(&poll_id) else {
            return Vec::new();
        };
        ids.iter()
            .filter_map(|id| inner.live.get(id))
            .filter_map(Weak::upgrade)
            .collect()
    }

    /// Whether the connection is registered.
    pub fn is_registered(&self, id: &ConnectionId) -> bool {
        self.inner.lock().live.contains_key(id)
    }

    /// IDs subscribed to a poll, sorted.
    pub fn subscriber_ids(&self, poll_id: PollId) -> Vec<ConnectionId> {
        let inner = self.inner.lock();
        let mut ids: Vec<_> = inner
            .subscribers
            .get(&poll_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        ids
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.inner.lock().live.len()
    }

    /// Number of polls with at least one subscriber.
    pub fn subscribed_poll_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }
}
