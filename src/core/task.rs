use chrono::NaiveDateTime;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Task lifecycle status. Stored as human-readable strings in the `tasks`
/// table, shared with the companion bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStatus {
    #[default]
    InProgress,
    Overdue,
    PendingReview,
    Completed,
}

impl TaskStatus {
    pub fn as_db_value(&self) -> &'static str {
        match self {
            Self::InProgress => "In Progress",
            Self::Overdue => "Overdue",
            Self::PendingReview => "Pending Review",
            Self::Completed => "Completed",
        }
    }

    pub fn from_db_value(s: &str) -> Option<Self> {
        match s {
            "In Progress" => Some(Self::InProgress),
            "Overdue" => Some(Self::Overdue),
            "Pending Review" => Some(Self::PendingReview),
            "Completed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl Serialize for TaskStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_db_value())
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // An unrecognized stored value degrades to the default instead of
        // failing the whole page.
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_db_value(&raw).unwrap_or_default())
    }
}

/// A row of the `tasks` table. Owned jointly by assigner and assignee;
/// addressed by their chat identifiers, never by profile UUIDs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub client: Option<String>,
    pub due_date: NaiveDateTime,
    pub description: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    pub status: TaskStatus,
    pub assigner_telegram_id: i64,
    pub assignee_telegram_id: Option<i64>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

impl Task {
    /// Past due and not yet completed.
    pub fn is_overdue(&self, now: NaiveDateTime) -> bool {
        !self.status.is_done() && self.due_date < now
    }
}

/// Insert payload for a new task. Status is always the default on creation;
/// comments start unset.
#[derive(Debug, Clone, Serialize)]
pub struct NewTask {
    pub title: String,
    pub client: Option<String>,
    pub due_date: NaiveDateTime,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub assigner_telegram_id: i64,
    pub assignee_telegram_id: Option<i64>,
}

/// Partial update for an existing task. Absent fields are left untouched by
/// the store; the assigner is immutable and has no field here.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_telegram_id: Option<Option<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDateTime>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        serde_json::to_value(self)
            .map(|v| v.as_object().is_some_and(|m| m.is_empty()))
            .unwrap_or(true)
    }
}
