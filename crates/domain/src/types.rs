//! Domain data types
//!
//! Normalized shapes handed to the hosting runtime. Upstream wire formats
//! (with their original field names) live in the client crate; everything
//! here is already mapped and deduplicated.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{ITEM_TYPE_HOMEWORK, ITEM_TYPE_WEEKPLAN};

/// Authentication status of the single session a client instance owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    Unauthenticated,
    Authenticating,
    Authenticated,
    Failed,
}

/// One child as seen by the portal.
///
/// `external_id` is the stable, caller-facing key (the login-level user id);
/// `internal_id` is the institution-scoped profile id the data endpoints
/// require. The resolver guarantees the `external_id → internal_id` mapping
/// is injective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildIdentity {
    pub external_id: String,
    pub internal_id: String,
    pub display_name: String,
}

/// Classification of an upstream calendar item.
///
/// A single upstream stream carries both scheduled classes and homework;
/// the numeric `itemType` is the only discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Weekplan,
    Homework,
    Other(i64),
}

impl EventKind {
    pub fn from_item_type(item_type: i64) -> Self {
        match item_type {
            ITEM_TYPE_WEEKPLAN => Self::Weekplan,
            ITEM_TYPE_HOMEWORK => Self::Homework,
            other => Self::Other(other),
        }
    }
}

/// A normalized calendar entry (weekplan class or homework assignment).
///
/// Start/end keep the upstream textual timestamps; presentation layers own
/// timezone handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub start: String,
    pub end: String,
    pub course: String,
    pub activity: String,
    pub description: String,
    pub kind: EventKind,
}

impl CalendarEvent {
    /// Deduplication key: upstream pagination/overlap windows can return the
    /// same event twice within one child's fetch.
    pub fn signature(&self) -> (String, String) {
        (self.start.clone(), self.course.clone())
    }
}

/// Scheduled-class events for one child and week window
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekplanBundle {
    pub week: String,
    pub events: Vec<CalendarEvent>,
}

/// Homework assignments for one child and week window
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeworkBundle {
    pub week: String,
    pub assignments: Vec<CalendarEvent>,
}

/// Today's attendance for one child
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceOverview {
    pub status_code: i64,
    pub status_label: String,
    pub check_in_time: Option<String>,
    pub check_out_time: Option<String>,
    pub entry_time: Option<String>,
    pub exit_time: Option<String>,
    pub comment: Option<String>,
    pub exit_with: Option<String>,
}

/// Inbox summary across the account (messages are not per-child upstream)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagesSummary {
    pub unread_count: u32,
    pub latest: Option<LatestMessage>,
}

/// The newest message thread, for notification-style display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestMessage {
    pub subject: String,
    pub text: String,
    pub sender: String,
}

/// The data kinds fetched per refresh, used to attribute partial failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    Calendar,
    Presence,
    Messages,
}

impl std::fmt::Display for DataKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Calendar => "calendar",
            Self::Presence => "presence",
            Self::Messages => "messages",
        };
        f.write_str(name)
    }
}

/// A recoverable fetch error recorded in the snapshot instead of raised
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFailure {
    /// External id of the affected child, or `None` for account-level kinds
    pub child: Option<String>,
    pub kind: DataKind,
    pub message: String,
}

/// Per-child aggregate. Sections are `None` when never fetched successfully;
/// a failed refresh keeps the previous value (stale-but-available).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildSnapshot {
    pub weekplan: Option<WeekplanBundle>,
    pub homework: Option<HomeworkBundle>,
    pub presence: Option<PresenceOverview>,
}

/// Aggregate result of one `refresh()` call, serializable as a flat mapping
/// of named sections for the hosting runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub children: Vec<ChildIdentity>,
    /// Per-child data keyed by `external_id`
    pub by_child: HashMap<String, ChildSnapshot>,
    pub messages: MessagesSummary,
    /// Recoverable failures collected during the fan-out
    pub errors: Vec<FetchFailure>,
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self {
            children: Vec::new(),
            by_child: HashMap::new(),
            messages: MessagesSummary::default(),
            errors: Vec::new(),
            fetched_at: Utc::now(),
        }
    }

    pub fn weekplan(&self, external_id: &str) -> Option<&WeekplanBundle> {
        self.by_child.get(external_id).and_then(|c| c.weekplan.as_ref())
    }

    pub fn homework(&self, external_id: &str) -> Option<&HomeworkBundle> {
        self.by_child.get(external_id).and_then(|c| c.homework.as_ref())
    }

    pub fn presence(&self, external_id: &str) -> Option<&PresenceOverview> {
        self.by_child.get(external_id).and_then(|c| c.presence.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_kind_partition_matches_upstream_discriminators() {
        assert_eq!(EventKind::from_item_type(9), EventKind::Weekplan);
        assert_eq!(EventKind::from_item_type(4), EventKind::Homework);
        assert_eq!(EventKind::from_item_type(7), EventKind::Other(7));
    }

    #[test]
    fn signature_is_start_and_course() {
        let event = CalendarEvent {
            start: "2026/08/24 08:00".into(),
            end: "2026/08/24 08:45".into(),
            course: "Matematik".into(),
            activity: "Brøker".into(),
            description: String::new(),
            kind: EventKind::Weekplan,
        };
        assert_eq!(event.signature(), ("2026/08/24 08:00".into(), "Matematik".into()));
    }

    #[test]
    fn snapshot_accessors_key_on_external_id() {
        let mut snapshot = Snapshot::empty();
        snapshot.by_child.insert(
            "1001".into(),
            ChildSnapshot {
                weekplan: Some(WeekplanBundle { week: "Week 35".into(), events: vec![] }),
                ..Default::default()
            },
        );
        assert!(snapshot.weekplan("1001").is_some());
        assert!(snapshot.weekplan("1002").is_none());
        assert!(snapshot.homework("1001").is_none());
    }

    #[test]
    fn snapshot_serializes_named_sections() {
        let snapshot = Snapshot::empty();
        let value = serde_json::to_value(&snapshot).unwrap();
        for key in ["children", "by_child", "messages", "errors", "fetched_at"] {
            assert!(value.get(key).is_some(), "missing section {key}");
        }
    }
}
