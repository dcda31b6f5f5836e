use super::*;
use comicmaker_types::{
    EntityId, HistoryPage, HistoryQuery, HistoryRecord, TaskCreated, TaskId, TaskStatusResponse,
};

impl ApiClient {
    /// Start a long-running tool task (script, storyboard, image, video, audio ...).
    pub async fn create_tool_task(&self, tool_type: &str, form: FormPayload) -> ApiResult<TaskCreated> {
        tracing::info!("Creating {} task", tool_type);
        let value = self
            .send_form(
                &format!("/tools/{}/create", segment(tool_type)),
                Method::POST,
                form,
            )
            .await?;
        self.envelope.unwrap_entity(value, "task")
    }

    /// Current status of a task.
    pub async fn task_status(&self, task_id: &TaskId) -> ApiResult<TaskStatusResponse> {
        self.request_as(
            &format!("/tasks/{}/status", segment(task_id.as_str())),
            Method::GET,
            RequestBody::Empty,
        )
        .await
    }

    /// Result payload of a finished task.
    pub async fn task_result(&self, task_id: &TaskId) -> ApiResult<Value> {
        self.get(&format!("/tasks/{}/result", segment(task_id.as_str())))
            .await
    }

    /// One page of the tool history.
    pub async fn list_history(&self, query: &HistoryQuery) -> ApiResult<HistoryPage> {
        let params = query
            .to_pairs()
            .into_iter()
            .map(|(key, value)| format!("{}={}", key, segment(&value)))
            .collect::<Vec<_>>()
            .join("&");
        let value = self.get(&format!("/tools/history?{}", params)).await?;
        match value {
            Value::Array(_) | Value::Null => Ok(HistoryPage {
                records: self.envelope.unwrap_collection(value, "records")?,
                page: Some(query.page),
                limit: Some(query.limit),
                ..Default::default()
            }),
            other => decode(other, "/tools/history"),
        }
    }

    /// Full record of one history entry.
    pub async fn history_detail(&self, record_id: &EntityId) -> ApiResult<HistoryRecord> {
        let value = self
            .get(&format!("/tools/history/{}", segment(record_id.as_str())))
            .await?;
        self.envelope.unwrap_entity(value, "record")
    }
}
