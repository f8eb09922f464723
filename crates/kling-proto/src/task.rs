//! Task records: the wire shape returned by status endpoints and the
//! normalized, immutable [`Task`] value built from it.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{KlingError, Result};
use crate::status::TaskStatus;

/// The `data` object of a task create/status response, as sent on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskData {
    pub task_id: String,
    pub task_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_status_msg: Option<String>,
    /// Milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    /// Milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_result: Option<Value>,
}

/// One observation of a remote generation job.
///
/// Each poll yields a fresh `Task`; values are never mutated after
/// construction. `R` is the family-specific result payload, decoded only
/// once the task has succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct Task<R = Value> {
    id: String,
    status: TaskStatus,
    status_message: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    result: Option<R>,
}

impl<R> Task<R> {
    pub fn new(id: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            id: id.into(),
            status,
            status_message: None,
            created_at: None,
            updated_at: None,
            result: None,
        }
    }

    pub fn with_status_message(mut self, message: impl Into<String>) -> Self {
        self.status_message = Some(message.into());
        self
    }

    pub fn with_timestamps(
        mut self,
        created_at: Option<DateTime<Utc>>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        self.created_at = created_at;
        self.updated_at = updated_at;
        self
    }

    /// Attaches a result payload. Ignored unless the task has succeeded.
    pub fn with_result(mut self, result: R) -> Self {
        if self.status == TaskStatus::Succeeded {
            self.result = Some(result);
        }
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Free-form status text from the service, whatever the state.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// The failure reason. `None` unless the task has failed.
    pub fn error_message(&self) -> Option<&str> {
        match self.status {
            TaskStatus::Failed => self.status_message.as_deref().filter(|m| !m.is_empty()),
            _ => None,
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// The result payload. `None` unless the task has succeeded.
    pub fn result(&self) -> Option<&R> {
        self.result.as_ref()
    }

    pub fn into_result(self) -> Option<R> {
        self.result
    }
}

impl<R: DeserializeOwned> Task<R> {
    /// Decodes a raw `data` value into a task, decoding the result payload
    /// as `R` when the task has succeeded.
    pub fn from_value(data: Value) -> Result<Self> {
        let raw: TaskData = serde_json::from_value(data)
            .map_err(|e| KlingError::malformed(format!("invalid task record: {e}")))?;
        Self::try_from(raw)
    }
}

impl<R: DeserializeOwned> TryFrom<TaskData> for Task<R> {
    type Error = KlingError;

    fn try_from(raw: TaskData) -> Result<Self> {
        if raw.task_id.is_empty() {
            return Err(KlingError::malformed("task record has an empty task_id"));
        }
        let status = TaskStatus::from_wire(&raw.task_status)?;

        let result = match (status, raw.task_result) {
            (TaskStatus::Succeeded, Some(payload)) if !payload.is_null() => {
                let decoded = serde_json::from_value(payload).map_err(|e| {
                    KlingError::malformed(format!(
                        "invalid task_result for task {}: {e}",
                        raw.task_id
                    ))
                })?;
                Some(decoded)
            }
            _ => None,
        };

        Ok(Self {
            id: raw.task_id,
            status,
            status_message: raw.task_status_msg,
            created_at: raw.created_at.and_then(DateTime::from_timestamp_millis),
            updated_at: raw.updated_at.and_then(DateTime::from_timestamp_millis),
            result,
        })
    }
}

impl<R: Serialize> Task<R> {
    /// Encodes the task back into its wire shape.
    pub fn to_wire(&self) -> Result<TaskData> {
        let task_result = self
            .result
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| KlingError::malformed(format!("unencodable task_result: {e}")))?;

        Ok(TaskData {
            task_id: self.id.clone(),
            task_status: self.status.as_wire().to_string(),
            task_status_msg: self.status_message.clone(),
            created_at: self.created_at.map(|t| t.timestamp_millis()),
            updated_at: self.updated_at.map(|t| t.timestamp_millis()),
            task_result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::VideoResult;
    use serde_json::json;

    #[test]
    fn decodes_succeeded_task_with_typed_result() {
        let task: Task<VideoResult> = Task::from_value(json!({
            "task_id": "860000000001",
            "task_status": "succeed",
            "task_status_msg": "",
            "created_at": 1_722_769_557_708_i64,
            "updated_at": 1_722_769_600_000_i64,
            "task_result": {
                "videos": [
                    {"id": "v-1", "url": "https://cdn.example.com/v-1.mp4", "duration": "5.1"}
                ]
            }
        }))
        .unwrap();

        assert_eq!(task.id(), "860000000001");
        assert_eq!(task.status(), TaskStatus::Succeeded);
        assert_eq!(task.error_message(), None);
        assert_eq!(task.created_at().unwrap().timestamp_millis(), 1_722_769_557_708);
        let videos = &task.result().unwrap().videos;
        assert_eq!(videos[0].url, "https://cdn.example.com/v-1.mp4");
    }

    #[test]
    fn result_is_ignored_until_succeeded() {
        let task: Task<VideoResult> = Task::from_value(json!({
            "task_id": "t-1",
            "task_status": "processing",
            "task_result": {"videos": []}
        }))
        .unwrap();
        assert_eq!(task.status(), TaskStatus::Running);
        assert!(task.result().is_none());
    }

    #[test]
    fn error_message_only_when_failed() {
        let running: Task = Task::new("t-1", TaskStatus::Running).with_status_message("queued");
        assert_eq!(running.status_message(), Some("queued"));
        assert_eq!(running.error_message(), None);

        let failed: Task = Task::new("t-1", TaskStatus::Failed).with_status_message("bad input");
        assert_eq!(failed.error_message(), Some("bad input"));
    }

    #[test]
    fn unknown_status_is_malformed() {
        let err = Task::<Value>::from_value(json!({"task_id": "t-1", "task_status": "exploded"}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn missing_fields_are_malformed() {
        let err = Task::<Value>::from_value(json!({"task_status": "succeed"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);

        let err = Task::<Value>::from_value(json!({"task_id": "", "task_status": "succeed"}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn bad_result_payload_is_malformed() {
        let err = Task::<VideoResult>::from_value(json!({
            "task_id": "t-1",
            "task_status": "succeed",
            "task_result": {"videos": "not-a-list"}
        }))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn failed_message_survives_wire_encoding() {
        let original: Task<VideoResult> =
            Task::new("t-9", TaskStatus::Failed).with_status_message("insufficient credits");

        let wire = original.to_wire().unwrap();
        assert_eq!(wire.task_status, "failed");

        let decoded = Task::<VideoResult>::try_from(wire).unwrap();
        assert_eq!(decoded, original);
        assert_eq!(decoded.error_message(), Some("insufficient credits"));
    }

    #[test]
    fn with_result_is_ignored_for_non_succeeded() {
        let task = Task::new("t-1", TaskStatus::Running).with_result(json!({"videos": []}));
        assert!(task.result().is_none());
    }
}
