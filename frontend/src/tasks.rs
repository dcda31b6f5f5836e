//! Tool tasks: creation, status polling and result retrieval.
//!
//! The backend runs tools asynchronously. A task is only ever considered
//! finished once the backend reports a terminal status; the poller never
//! infers completion. Stopping a wait is local only: the backend task keeps
//! running.

use crate::api::{ApiClient, ApiError, FormPayload};
use comicmaker_types::{Task, TaskId, TaskStatus, TaskStatusResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Task errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TaskError {
    /// Result requested before the task reported success
    #[error("Task {id} is not ready (last status: {})", .status.map(|s| s.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    NotReady {
        id: TaskId,
        status: Option<TaskStatus>,
    },
    #[error("Task {id} failed: {message}")]
    Failed { id: TaskId, message: String },
    #[error("Task {id} did not finish within {waited:?}")]
    TimedOut { id: TaskId, waited: Duration },
    /// Local polling stopped; the backend task was left running
    #[error("Stopped waiting for task {0}")]
    Cancelled(TaskId),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Growth of the delay between two status checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backoff {
    Fixed,
    #[default]
    Exponential,
}

/// How often and for how long to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// Upper bound of the delay under exponential backoff
    pub max_interval: Duration,
    pub backoff: Backoff,
    /// Give up after this long
    pub max_wait: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            max_interval: Duration::from_millis(10_000),
            backoff: Backoff::Exponential,
            max_wait: Duration::from_secs(600),
        }
    }
}

impl PollPolicy {
    /// Delay before the status check following `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.interval,
            Backoff::Exponential => {
                let factor = 2u32.saturating_pow(attempt.min(16));
                self.interval
                    .saturating_mul(factor)
                    .min(self.max_interval.max(self.interval))
            }
        }
    }
}

/// Creates tool tasks and tracks what the backend last reported for them.
pub struct TaskPoller {
    api: ApiClient,
    tasks: Mutex<HashMap<TaskId, Task>>,
}

impl TaskPoller {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Start a tool task.
    pub async fn create_task(&self, kind: &str, payload: FormPayload) -> Result<TaskId, TaskError> {
        let created = self.api.create_tool_task(kind, payload).await?;
        let mut task = Task::new(created.task_id.clone(), kind);
        if let Some(status) = created.status {
            task.status = status;
        }
        tracing::info!("Created {} task {} ({})", kind, task.id, task.status);
        self.with_tasks(|tasks| tasks.insert(task.id.clone(), task));
        Ok(created.task_id)
    }

    /// Check a task once and return the full status report.
    pub async fn status_report(&self, id: &TaskId) -> Result<TaskStatusResponse, TaskError> {
        let report = self.api.task_status(id).await?;
        tracing::debug!("Task {} is {}", id, report.status);
        self.with_tasks(|tasks| {
            tasks
                .entry(id.clone())
                .or_insert_with(|| Task::new(id.clone(), "unknown"))
                .status = report.status;
        });
        Ok(report)
    }

    /// Check a task once.
    pub async fn poll_status(&self, id: &TaskId) -> Result<TaskStatus, TaskError> {
        Ok(self.status_report(id).await?.status)
    }

    /// Last status the backend reported, if the task was seen at all.
    pub fn last_status(&self, id: &TaskId) -> Option<TaskStatus> {
        self.with_tasks(|tasks| tasks.get(id).map(|t| t.status))
    }

    /// Snapshot of a tracked task.
    pub fn task(&self, id: &TaskId) -> Option<Task> {
        self.with_tasks(|tasks| tasks.get(id).cloned())
    }

    /// Fetch the result of a task that reported success.
    pub async fn get_result(&self, id: &TaskId) -> Result<Value, TaskError> {
        let status = self.last_status(id);
        if status != Some(TaskStatus::Succeeded) {
            return Err(TaskError::NotReady {
                id: id.clone(),
                status,
            });
        }
        let result = self.api.task_result(id).await?;
        self.with_tasks(|tasks| {
            if let Some(task) = tasks.get_mut(id) {
                task.result = Some(result.clone());
            }
        });
        Ok(result)
    }

    /// Poll until the task reaches a terminal status.
    ///
    /// Returns the final report on success. A failed task yields
    /// [`TaskError::Failed`] with the backend message; exceeding
    /// `policy.max_wait` yields [`TaskError::TimedOut`]; firing `cancel`
    /// yields [`TaskError::Cancelled`].
    pub async fn wait(
        &self,
        id: &TaskId,
        policy: &PollPolicy,
        cancel: &CancellationToken,
    ) -> Result<TaskStatusResponse, TaskError> {
        let started = tokio::time::Instant::now();
        let mut attempt = 0u32;

        loop {
            let report = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(self.cancelled(id)),
                report = self.status_report(id) => report?,
            };

            match report.status {
                TaskStatus::Succeeded => {
                    tracing::info!("Task {} succeeded", id);
                    return Ok(report);
                }
                TaskStatus::Failed => {
                    let message = report
                        .error
                        .or(report.message)
                        .unwrap_or_else(|| "Task failed".to_string());
                    tracing::error!("Task {} failed: {}", id, message);
                    return Err(TaskError::Failed {
                        id: id.clone(),
                        message,
                    });
                }
                TaskStatus::Pending | TaskStatus::Running => {}
            }

            let elapsed = started.elapsed();
            if elapsed >= policy.max_wait {
                tracing::warn!("Gave up waiting for task {} after {:?}", id, elapsed);
                return Err(TaskError::TimedOut {
                    id: id.clone(),
                    waited: elapsed,
                });
            }

            let delay = policy.delay(attempt).min(policy.max_wait - elapsed);
            attempt = attempt.saturating_add(1);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(self.cancelled(id)),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Create a task, wait for it and fetch its result.
    pub async fn run(
        &self,
        kind: &str,
        payload: FormPayload,
        policy: &PollPolicy,
        cancel: &CancellationToken,
    ) -> Result<Value, TaskError> {
        let id = self.create_task(kind, payload).await?;
        self.wait(&id, policy, cancel).await?;
        self.get_result(&id).await
    }

    fn cancelled(&self, id: &TaskId) -> TaskError {
        tracing::info!("Stopped polling task {}; it keeps running on the backend", id);
        TaskError::Cancelled(id.clone())
    }

    fn with_tasks<R>(&self, f: impl FnOnce(&mut HashMap<TaskId, Task>) -> R) -> R {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_delay() {
        let policy = PollPolicy {
            backoff: Backoff::Fixed,
            ..Default::default()
        };
        assert_eq!(policy.delay(0), Duration::from_secs(1));
        assert_eq!(policy.delay(7), Duration::from_secs(1));
    }

    #[test]
    fn test_exponential_delay_is_capped() {
        let policy = PollPolicy::default();
        let delays: Vec<u64> = (0..6).map(|a| policy.delay(a).as_millis() as u64).collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 8000, 10_000, 10_000]);
        assert_eq!(policy.delay(u32::MAX), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_result_before_success_is_not_ready() {
        // Nothing listens here; the check must fail before any request is made.
        let poller = TaskPoller::new(ApiClient::new("http://127.0.0.1:9/api"));
        let id = TaskId::from("t-1");

        assert_eq!(
            poller.get_result(&id).await,
            Err(TaskError::NotReady {
                id: id.clone(),
                status: None
            })
        );
    }

    #[tokio::test]
    async fn test_cancelled_token_stops_waiting() {
        let poller = TaskPoller::new(ApiClient::new("http://127.0.0.1:9/api"));
        let token = CancellationToken::new();
        token.cancel();

        let result = poller
            .wait(&TaskId::from("t-2"), &PollPolicy::default(), &token)
            .await;
        assert_eq!(result, Err(TaskError::Cancelled(TaskId::from("t-2"))));
    }
}
