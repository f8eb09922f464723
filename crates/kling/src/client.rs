//! Async client.

use std::marker::PhantomData;
use std::sync::Arc;

use kling_proto::models::{AudioResult, IdentifyFaceRequest, IdentifyFaceResponse, TtsRequest};
use kling_proto::{Result, Task};
use tracing::info;

use crate::accessor::{AsyncTaskAccessor, HttpTaskAccessor};
use crate::calls;
use crate::config::KlingConfig;
use crate::family::{
    Avatar, ImageToVideo, LipSync, MultiImageToVideo, Submission, TaskFamily, TextToAudio,
    TextToVideo, VideoEffects, VideoExtension, VideoToAudio,
};
use crate::transport::{AsyncTransport, ReqwestTransport};
use crate::waiter::{self, WaitOptions};

/// Entry point for the non-blocking API.
///
/// Cloning is cheap; clones share the transport and its connection pool.
pub struct KlingClient<T: ?Sized = ReqwestTransport> {
    transport: Arc<T>,
    wait_options: WaitOptions,
}

impl<T: ?Sized> Clone for KlingClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            wait_options: self.wait_options,
        }
    }
}

impl<T: ?Sized> std::fmt::Debug for KlingClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KlingClient")
            .field("wait_options", &self.wait_options)
            .finish_non_exhaustive()
    }
}

impl KlingClient<ReqwestTransport> {
    pub fn new(config: &KlingConfig) -> Result<Self> {
        config.validate()?;
        let wait_options = config.poll.wait_options()?;
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::with_transport(Arc::new(transport), wait_options))
    }

    /// Builds a client from `KLING_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(&KlingConfig::from_env()?)
    }
}

impl<T: AsyncTransport + ?Sized> KlingClient<T> {
    pub fn with_transport(transport: Arc<T>, wait_options: WaitOptions) -> Self {
        Self {
            transport,
            wait_options,
        }
    }

    /// Options used by `create_and_wait`.
    pub fn wait_options(&self) -> &WaitOptions {
        &self.wait_options
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Operations for any family.
    pub fn jobs<F: TaskFamily>(&self) -> Jobs<'_, T, F> {
        Jobs {
            transport: &self.transport,
            wait_options: self.wait_options,
            _family: PhantomData,
        }
    }

    pub fn text_to_video(&self) -> Jobs<'_, T, TextToVideo> {
        self.jobs()
    }

    pub fn image_to_video(&self) -> Jobs<'_, T, ImageToVideo> {
        self.jobs()
    }

    pub fn multi_image_to_video(&self) -> Jobs<'_, T, MultiImageToVideo> {
        self.jobs()
    }

    pub fn video_extension(&self) -> Jobs<'_, T, VideoExtension> {
        self.jobs()
    }

    pub fn avatar(&self) -> Jobs<'_, T, Avatar> {
        self.jobs()
    }

    pub fn lip_sync(&self) -> Jobs<'_, T, LipSync> {
        self.jobs()
    }

    pub fn video_effects(&self) -> Jobs<'_, T, VideoEffects> {
        self.jobs()
    }

    pub fn text_to_audio(&self) -> Jobs<'_, T, TextToAudio> {
        self.jobs()
    }

    pub fn video_to_audio(&self) -> Jobs<'_, T, VideoToAudio> {
        self.jobs()
    }

    /// Synthesizes speech. The returned task already carries its audio.
    pub async fn tts(&self, request: &TtsRequest) -> Result<Task<AudioResult>> {
        let response = self.transport.execute(calls::tts_request(request)?).await?;
        let task = calls::decode_tts(response)?;
        info!(task_id = %task.id(), status = %task.status(), "Synthesized speech");
        Ok(task)
    }
}

/// Operations for one family, borrowed from a [`KlingClient`].
pub struct Jobs<'c, T: ?Sized, F> {
    transport: &'c T,
    wait_options: WaitOptions,
    _family: PhantomData<fn() -> F>,
}

impl<'c, T, F> Jobs<'c, T, F>
where
    T: AsyncTransport + ?Sized,
    F: TaskFamily,
{
    /// Validates and submits a request.
    pub async fn create(&self, request: &F::Request) -> Result<Submission<F::Output>> {
        let (api_request, status_endpoint) = calls::create_request::<F>(request)?;
        let response = self.transport.execute(api_request).await?;
        let submission = calls::decode_submission(response, status_endpoint)?;
        info!(
            family = F::NAME,
            task_id = %submission.task_id(),
            status = %submission.task().status(),
            "Created task"
        );
        Ok(submission)
    }

    /// Current state of a task created at the family endpoint.
    pub async fn get(&self, task_id: &str) -> Result<Task<F::Output>> {
        AsyncTaskAccessor::fetch(&self.accessor(), task_id).await
    }

    pub async fn list(&self, page_num: u32, page_size: u32) -> Result<Vec<Task<F::Output>>> {
        let request = calls::list_request(F::ENDPOINT, page_num, page_size)?;
        calls::decode_task_list(self.transport.execute(request).await?)
    }

    /// Accessor polling the family's status endpoint.
    pub fn accessor(&self) -> HttpTaskAccessor<'c, T, F::Output> {
        HttpTaskAccessor::new(self.transport, F::status_endpoint())
    }

    pub async fn wait_for_completion(
        &self,
        task_id: &str,
        options: &WaitOptions,
    ) -> Result<Task<F::Output>> {
        waiter::wait(&self.accessor(), task_id, options).await
    }

    /// Polls a submission on the endpoint it was created at.
    pub async fn wait_for_submission(
        &self,
        submission: &Submission<F::Output>,
        options: &WaitOptions,
    ) -> Result<Task<F::Output>> {
        let accessor = HttpTaskAccessor::new(self.transport, submission.status_endpoint().clone());
        waiter::wait(&accessor, submission.task_id(), options).await
    }

    /// Submits a request and waits with the client's options.
    pub async fn create_and_wait(&self, request: &F::Request) -> Result<Task<F::Output>> {
        let submission = self.create(request).await?;
        self.wait_for_submission(&submission, &self.wait_options).await
    }
}

impl<T> Jobs<'_, T, LipSync>
where
    T: AsyncTransport + ?Sized,
{
    /// Detects faces in a video; the session id feeds a [`LipSync`] request.
    pub async fn identify_faces(
        &self,
        request: &IdentifyFaceRequest,
    ) -> Result<IdentifyFaceResponse> {
        let response = self
            .transport
            .execute(calls::identify_faces_request(request)?)
            .await?;
        let faces = calls::decode_identify_faces(response)?;
        info!(session_id = %faces.session_id, faces = faces.face_data.len(), "Identified faces");
        Ok(faces)
    }
}
