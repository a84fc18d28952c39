use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Task lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Active,
    Paused,
    Resolved,
    /// Copy source for new tasks; never actionable itself
    Template,
    /// Tombstone for removed tasks
    Deleted,
}

impl Status {
    /// Statuses that carry a short numeric ID in the local index.
    /// Resolved and deleted tasks give their ID back.
    pub fn bears_id(self) -> bool {
        matches!(
            self,
            Status::Pending | Status::Active | Status::Paused | Status::Template
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Pending => "pending",
            Status::Active => "active",
            Status::Paused => "paused",
            Status::Resolved => "resolved",
            Status::Template => "template",
            Status::Deleted => "deleted",
        };
        write!(f, "{}", name)
    }
}

/// Priority, ordered most-urgent first. P2 is the unmarked default.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum Priority {
    P0,
    P1,
    #[default]
    P2,
    P3,
}

impl Priority {
    /// Parse a bare priority token like `P1` or `p1`.
    pub fn from_token(token: &str) -> Option<Priority> {
        match token.to_ascii_uppercase().as_str() {
            "P0" => Some(Priority::P0),
            "P1" => Some(Priority::P1),
            "P2" => Some(Priority::P2),
            "P3" => Some(Priority::P3),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Priority::P0 => "P0",
            Priority::P1 => "P1",
            Priority::P2 => "P2",
            Priority::P3 => "P3",
        };
        write!(f, "{}", name)
    }
}

/// A single unit of work or record.
///
/// The short numeric `id` lives in the per-machine ID index rather than the
/// task file, so it is skipped during (de)serialization and attached by the
/// store after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub uuid: Uuid,
    #[serde(skip)]
    pub id: Option<u64>,
    pub status: Status,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
    pub created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<DateTime<Utc>>,
    /// Modified since the last save
    #[serde(skip)]
    pub write_pending: bool,
}

impl Task {
    /// Create a fresh task with the given status and summary, marked
    /// write-pending and not yet carrying a short ID.
    pub fn new(status: Status, summary: String) -> Self {
        Task {
            uuid: Uuid::new_v4(),
            id: None,
            status,
            summary,
            tags: Vec::new(),
            project: None,
            priority: Priority::default(),
            notes: String::new(),
            created: Utc::now(),
            resolved: None,
            write_pending: true,
        }
    }

    /// Move the task to resolved and stamp the resolution time.
    pub fn resolve(&mut self) {
        self.status = Status::Resolved;
        self.resolved = Some(Utc::now());
        self.write_pending = true;
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "{}: {}", id, self.summary),
            None => write!(f, "{}", self.summary),
        }
    }
}
