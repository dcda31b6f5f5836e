//! Long-running generation tasks.

use crate::id::EntityId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identifier of a backend task.
pub type TaskId = EntityId;

/// Lifecycle state of a task as reported by the backend.
///
/// `Succeeded` and `Failed` are terminal. Several spellings are accepted on
/// the wire because different tool workers report status differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[serde(alias = "queued", alias = "created")]
    Pending,
    #[serde(alias = "processing", alias = "in_progress")]
    Running,
    #[serde(alias = "success", alias = "completed", alias = "done")]
    Succeeded,
    #[serde(alias = "error", alias = "failure")]
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Succeeded | TaskStatus::Failed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Succeeded => "succeeded",
            TaskStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Response to a tool task creation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCreated {
    #[serde(alias = "id")]
    pub task_id: TaskId,
    #[serde(default)]
    pub status: Option<TaskStatus>,
}

/// Response to a task status query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatusResponse {
    #[serde(default, alias = "id")]
    pub task_id: Option<TaskId>,
    pub status: TaskStatus,
    /// Completion ratio in `0.0..=1.0` or a percentage, as reported
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Client-side view of a task.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: TaskId,
    /// Tool that created the task (e.g. `image`, `video`)
    pub kind: String,
    pub status: TaskStatus,
    pub result: Option<Value>,
}

impl Task {
    pub fn new(id: TaskId, kind: impl Into<String>) -> Self {
        Self {
            id,
            kind: kind.into(),
            status: TaskStatus::Pending,
            result: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_aliases() {
        let cases = [
            ("\"queued\"", TaskStatus::Pending),
            ("\"processing\"", TaskStatus::Running),
            ("\"completed\"", TaskStatus::Succeeded),
            ("\"error\"", TaskStatus::Failed),
        ];
        for (raw, expected) in cases {
            let status: TaskStatus = serde_json::from_str(raw).unwrap();
            assert_eq!(status, expected);
        }
    }

    #[test]
    fn test_only_succeeded_and_failed_are_terminal() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Running.is_terminal());
        assert!(TaskStatus::Succeeded.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
    }

    #[test]
    fn test_task_created_accepts_id_alias() {
        let created: TaskCreated = serde_json::from_str(r#"{"id": 17}"#).unwrap();
        assert_eq!(created.task_id.as_str(), "17");
        assert!(created.status.is_none());
    }
}
