//! One "get current status" round trip per call.
//!
//! The waiter only knows [`TaskAccessor`] / [`AsyncTaskAccessor`]. Anything
//! that can turn a task id into a [`Task`] qualifies; [`HttpTaskAccessor`]
//! is the implementation bound to a transport and a status endpoint.

use std::marker::PhantomData;

use async_trait::async_trait;
use kling_proto::{KlingError, Result, Task};
use serde::de::DeserializeOwned;

use crate::transport::{ApiRequest, ApiResponse, AsyncTransport, Transport};

const TASK_ID_PLACEHOLDER: &str = "{task_id}";

/// Fetches the current state of a task, blocking the calling thread.
pub trait TaskAccessor {
    type Output;

    fn fetch(&self, task_id: &str) -> Result<Task<Self::Output>>;
}

impl<R, F> TaskAccessor for F
where
    F: Fn(&str) -> Result<Task<R>>,
{
    type Output = R;

    fn fetch(&self, task_id: &str) -> Result<Task<R>> {
        self(task_id)
    }
}

/// Fetches the current state of a task without blocking the thread.
#[async_trait]
pub trait AsyncTaskAccessor: Send + Sync {
    type Output: Send;

    async fn fetch(&self, task_id: &str) -> Result<Task<Self::Output>>;
}

/// A status path template such as `/v1/videos/text2video/{task_id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEndpoint {
    template: String,
}

impl StatusEndpoint {
    /// Parses a template. It must be an absolute path containing the
    /// `{task_id}` placeholder exactly once.
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if !template.starts_with('/') {
            return Err(KlingError::Config(format!(
                "status endpoint {template:?} must start with '/'"
            )));
        }
        if template.matches(TASK_ID_PLACEHOLDER).count() != 1 {
            return Err(KlingError::Config(format!(
                "status endpoint {template:?} must contain {TASK_ID_PLACEHOLDER} exactly once"
            )));
        }
        Ok(Self { template })
    }

    /// The status template for tasks created at `collection`.
    pub fn for_collection(collection: &str) -> Self {
        Self {
            template: format!(
                "{}/{TASK_ID_PLACEHOLDER}",
                collection.trim_end_matches('/')
            ),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Substitutes a percent-encoded task id into the template.
    pub fn render(&self, task_id: &str) -> Result<String> {
        if task_id.trim().is_empty() {
            return Err(KlingError::validation("task id must not be empty"));
        }
        Ok(self
            .template
            .replace(TASK_ID_PLACEHOLDER, &urlencoding::encode(task_id)))
    }
}

/// Accessor that performs `GET <status endpoint>` through a transport and
/// decodes the result payload as `R`.
pub struct HttpTaskAccessor<'t, T: ?Sized, R> {
    transport: &'t T,
    endpoint: StatusEndpoint,
    _result: PhantomData<fn() -> R>,
}

impl<'t, T: ?Sized, R> HttpTaskAccessor<'t, T, R> {
    pub fn new(transport: &'t T, endpoint: StatusEndpoint) -> Self {
        Self {
            transport,
            endpoint,
            _result: PhantomData,
        }
    }

    pub fn endpoint(&self) -> &StatusEndpoint {
        &self.endpoint
    }
}

impl<T: ?Sized, R> std::fmt::Debug for HttpTaskAccessor<'_, T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTaskAccessor")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

pub(crate) fn decode_task<R: DeserializeOwned>(response: ApiResponse) -> Result<Task<R>> {
    let data = response.into_envelope()?.into_data()?;
    Task::from_value(data)
}

impl<T, R> TaskAccessor for HttpTaskAccessor<'_, T, R>
where
    T: Transport + ?Sized,
    R: DeserializeOwned,
{
    type Output = R;

    fn fetch(&self, task_id: &str) -> Result<Task<R>> {
        let path = self.endpoint.render(task_id)?;
        let response = self.transport.execute(ApiRequest::get(path))?;
        decode_task(response)
    }
}

#[async_trait]
impl<'t, T, R> AsyncTaskAccessor for HttpTaskAccessor<'t, T, R>
where
    T: AsyncTransport + ?Sized,
    R: DeserializeOwned + Send,
{
    type Output = R;

    async fn fetch(&self, task_id: &str) -> Result<Task<R>> {
        let path = self.endpoint.render(task_id)?;
        let response = self.transport.execute(ApiRequest::get(path)).await?;
        decode_task(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kling_proto::models::VideoResult;
    use kling_proto::{ErrorKind, TaskStatus};
    use serde_json::{Value, json};
    use std::sync::Mutex;

    /// Replays canned responses and records requested paths.
    struct CannedTransport {
        responses: Mutex<Vec<Result<ApiResponse>>>,
        paths: Mutex<Vec<String>>,
    }

    impl CannedTransport {
        fn new(responses: Vec<Result<ApiResponse>>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().rev().collect()),
                paths: Mutex::new(Vec::new()),
            }
        }
    }

    impl Transport for CannedTransport {
        fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
            self.paths.lock().unwrap().push(request.path);
            self.responses.lock().unwrap().pop().expect("no canned response left")
        }
    }

    fn ok(data: &Value) -> Result<ApiResponse> {
        Ok(ApiResponse {
            status: 200,
            body: serde_json::to_vec(&json!({
                "code": 0, "message": "SUCCEED", "request_id": "r", "data": data
            }))
            .unwrap(),
        })
    }

    #[test]
    fn template_validation() {
        assert!(StatusEndpoint::new("/v1/videos/text2video/{task_id}").is_ok());
        assert!(StatusEndpoint::new("v1/videos/{task_id}").is_err());
        assert!(StatusEndpoint::new("/v1/videos").is_err());
        assert!(StatusEndpoint::new("/v1/{task_id}/{task_id}").is_err());
    }

    #[test]
    fn render_percent_encodes() {
        let endpoint = StatusEndpoint::for_collection("/v1/videos/text2video/");
        assert_eq!(endpoint.template(), "/v1/videos/text2video/{task_id}");
        assert_eq!(
            endpoint.render("my task/1").unwrap(),
            "/v1/videos/text2video/my%20task%2F1"
        );
        assert_eq!(
            endpoint.render("").unwrap_err().kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn fetch_decodes_typed_task() {
        let transport = CannedTransport::new(vec![ok(&json!({
            "task_id": "t-1",
            "task_status": "succeed",
            "task_result": {"videos": [{"id": "v", "url": "https://cdn.example.com/v.mp4"}]}
        }))]);
        let accessor: HttpTaskAccessor<'_, _, VideoResult> = HttpTaskAccessor::new(
            &transport,
            StatusEndpoint::for_collection("/v1/videos/effects"),
        );

        let task = TaskAccessor::fetch(&accessor, "t-1").unwrap();
        assert_eq!(task.status(), TaskStatus::Succeeded);
        assert_eq!(task.result().unwrap().videos.len(), 1);
        assert_eq!(
            *transport.paths.lock().unwrap(),
            vec!["/v1/videos/effects/t-1".to_string()]
        );
    }

    #[test]
    fn fetch_propagates_errors_unchanged() {
        let transport = CannedTransport::new(vec![
            Err(KlingError::transport(std::io::Error::other("connection refused"))),
            Ok(ApiResponse {
                status: 200,
                body: br#"{"code":1303,"message":"rate limited","request_id":"r-9"}"#.to_vec(),
            }),
            ok(&json!({"task_id": "t-1", "task_status": "queued-ish"})),
        ]);
        let accessor: HttpTaskAccessor<'_, _, Value> = HttpTaskAccessor::new(
            &transport,
            StatusEndpoint::for_collection("/v1/audio/tts"),
        );

        assert_eq!(
            TaskAccessor::fetch(&accessor, "t-1").unwrap_err().kind(),
            ErrorKind::Transport
        );
        assert_eq!(
            TaskAccessor::fetch(&accessor, "t-1").unwrap_err().kind(),
            ErrorKind::Api
        );
        assert_eq!(
            TaskAccessor::fetch(&accessor, "t-1").unwrap_err().kind(),
            ErrorKind::MalformedResponse
        );
    }

    #[test]
    fn closures_are_accessors() {
        let accessor = |id: &str| -> Result<Task> { Ok(Task::new(id, TaskStatus::Running)) };
        assert_eq!(accessor.fetch("t-7").unwrap().id(), "t-7");
    }
}
