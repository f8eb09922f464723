//! Request building and response decoding shared by the async and
//! blocking clients. Nothing here performs I/O.

use kling_proto::models::{AudioResult, IdentifyFaceRequest, IdentifyFaceResponse, TtsRequest};
use kling_proto::{KlingError, Result, Task, TaskData, Validate};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::accessor::StatusEndpoint;
use crate::family::{Submission, TaskFamily};
use crate::transport::{ApiRequest, ApiResponse};

pub(crate) const IDENTIFY_FACE_ENDPOINT: &str = "/v1/videos/Identify-face";
pub(crate) const TTS_ENDPOINT: &str = "/v1/audio/tts";

pub(crate) const MAX_PAGE_NUM: u32 = 1000;
pub(crate) const MAX_PAGE_SIZE: u32 = 500;

fn post_validated<B: Serialize + Validate>(path: &str, body: &B) -> Result<ApiRequest> {
    body.validate()?;
    let body = serde_json::to_value(body)
        .map_err(|e| KlingError::validation(format!("request is not serializable: {e}")))?;
    Ok(ApiRequest::post(path, body))
}

/// The POST for a new task plus the endpoint the task will be polled on.
pub(crate) fn create_request<F: TaskFamily>(
    request: &F::Request,
) -> Result<(ApiRequest, StatusEndpoint)> {
    let endpoint = F::create_endpoint(request);
    let api_request = post_validated(endpoint, request)?;
    Ok((api_request, StatusEndpoint::for_collection(endpoint)))
}

pub(crate) fn decode_submission<R: DeserializeOwned>(
    response: ApiResponse,
    status_endpoint: StatusEndpoint,
) -> Result<Submission<R>> {
    let task = Task::from_value(response.into_envelope()?.into_data()?)?;
    Ok(Submission::new(task, status_endpoint))
}

pub(crate) fn list_request(collection: &str, page_num: u32, page_size: u32) -> Result<ApiRequest> {
    if !(1..=MAX_PAGE_NUM).contains(&page_num) {
        return Err(KlingError::validation(format!(
            "page_num must be in 1..={MAX_PAGE_NUM}, got {page_num}"
        )));
    }
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(KlingError::validation(format!(
            "page_size must be in 1..={MAX_PAGE_SIZE}, got {page_size}"
        )));
    }
    Ok(ApiRequest::get(collection)
        .with_query("pageNum", page_num)
        .with_query("pageSize", page_size))
}

/// A page of tasks. A missing or null `data` is an empty page.
pub(crate) fn decode_task_list<R: DeserializeOwned>(response: ApiResponse) -> Result<Vec<Task<R>>> {
    let envelope = response.into_envelope()?;
    let items = match envelope.data {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(data) => serde_json::from_value::<Vec<TaskData>>(data)
            .map_err(|e| KlingError::malformed(format!("task list: {e}")))?,
    };
    items.into_iter().map(Task::try_from).collect()
}

pub(crate) fn identify_faces_request(request: &IdentifyFaceRequest) -> Result<ApiRequest> {
    post_validated(IDENTIFY_FACE_ENDPOINT, request)
}

pub(crate) fn decode_identify_faces(response: ApiResponse) -> Result<IdentifyFaceResponse> {
    response.into_envelope()?.data_as()
}

pub(crate) fn tts_request(request: &TtsRequest) -> Result<ApiRequest> {
    post_validated(TTS_ENDPOINT, request)
}

/// TTS answers with a task whose result is already present.
pub(crate) fn decode_tts(response: ApiResponse) -> Result<Task<AudioResult>> {
    Task::from_value(response.into_envelope()?.into_data()?)
}
