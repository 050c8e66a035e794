//! Committed state changes and their outbound wire format.
//!
//! Every successful poll mutation yields exactly one [`PollEvent`]. The event
//! decides its own routing ([`PollEvent::target`]) and its own payload
//! ([`PollEvent::to_notification`]), so the broadcaster never needs to know
//! which mutation produced it.
//!
//! Wire envelope:
//!
//! ```json
//! {"type": "vote", "poll_id": 7, "data": { ...snapshot... }}
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::polls::{PollId, PollSnapshot};

/// Discriminant of a [`PollEvent`], serialized as the envelope `type`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A poll was created.
    PollCreated,
    /// A vote was accepted.
    Vote,
    /// A like was toggled.
    Like,
}

impl EventKind {
    /// Wire name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PollCreated => "poll_created",
            Self::Vote => "vote",
            Self::Like => "like",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of toggling a like.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeDelta {
    /// Whether the user likes the poll after the toggle.
    pub is_liked: bool,
    /// Like count after the toggle.
    pub like_count: i64,
}

/// An immutable notification describing one committed state change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PollEvent {
    /// New poll, broadcast to every live connection.
    PollCreated(PollSnapshot),
    /// Vote accepted; carries the refreshed snapshot.
    Vote(PollSnapshot),
    /// Like toggled; carries only the delta.
    Like {
        /// Poll whose like state changed.
        poll_id: PollId,
        /// New like state.
        delta: LikeDelta,
    },
}

impl PollEvent {
    /// Kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::PollCreated(_) => EventKind::PollCreated,
            Self::Vote(_) => EventKind::Vote,
            Self::Like { .. } => EventKind::Like,
        }
    }

    /// Routing target. `None` means every live connection.
    pub fn target(&self) -> Option<PollId> {
        match self {
            Self::PollCreated(_) => None,
            Self::Vote(snapshot) => Some(snapshot.id),
            Self::Like { poll_id, .. } => Some(*poll_id),
        }
    }

    /// The poll this event is about, regardless of routing.
    pub fn subject(&self) -> PollId {
        match self {
            Self::PollCreated(snapshot) | Self::Vote(snapshot) => snapshot.id,
            Self::Like { poll_id, .. } => *poll_id,
        }
    }

    /// Borrowing view in wire shape.
    pub fn to_notification(&self) -> Notification<'_> {
        let data = match self {
            Self::PollCreated(snapshot) | Self::Vote(snapshot) => NotificationData::Poll(snapshot),
            Self::Like { delta, .. } => NotificationData::Like(delta),
        };
        Notification {
            kind: self.kind(),
            poll_id: self.subject(),
            data,
        }
    }

    /// Serialize the wire envelope to a JSON string.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.to_notification())
    }
}

/// Outbound envelope sent to WebSocket clients.
#[derive(Debug, Serialize)]
pub struct Notification<'a> {
    /// Event kind.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Poll the event concerns.
    pub poll_id: PollId,
    /// Event payload.
    pub data: NotificationData<'a>,
}

/// Payload carried by a [`Notification`].
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum NotificationData<'a> {
    /// Full poll snapshot.
    Poll(&'a PollSnapshot),
    /// Minimal like delta.
    Like(&'a LikeDelta),
}
