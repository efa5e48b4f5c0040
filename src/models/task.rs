use serde::{Deserialize, Serialize};

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

/// Follow-up task or reminder.
///
/// Client and deal links are optional; a task may stand alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deal_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_ts: Option<i64>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub created_ts: i64,
    #[serde(default)]
    pub updated_ts: i64,
}

impl Task {
    pub fn new(id: &str, title: &str, ts: i64) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            client_id: None,
            deal_id: None,
            due_ts: None,
            completed: false,
            priority: TaskPriority::Medium,
            created_ts: ts,
            updated_ts: ts,
        }
    }

    /// Open task whose due date has passed
    pub fn is_overdue(&self, now_ts: i64) -> bool {
        match self.due_ts {
            Some(due) => !self.completed && due < now_ts,
            None => false,
        }
    }
}
