//! Generation families: which endpoint a request goes to and what a
//! finished task carries.

use kling_proto::models::{
    AudioResult, AvatarRequest, ImageToVideoRequest, LipSyncRequest, MultiImageToVideoParams,
    TextToAudioRequest, TextToVideoRequest, VideoEffectsRequest, VideoExtensionRequest,
    VideoResult, VideoToAudioRequest,
};
use kling_proto::{Task, Validate};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::accessor::StatusEndpoint;

/// Binds a request type, a create endpoint and a result type.
///
/// Status lookups use `<create endpoint>/{task_id}`.
pub trait TaskFamily: Send + Sync + 'static {
    type Request: Serialize + Validate + Send + Sync;
    type Output: DeserializeOwned + Send;

    /// Human-readable name used in logs.
    const NAME: &'static str;
    const ENDPOINT: &'static str;

    /// Endpoint a particular request is posted to.
    fn create_endpoint(_request: &Self::Request) -> &'static str {
        Self::ENDPOINT
    }

    /// Status endpoint for tasks created at the family endpoint.
    fn status_endpoint() -> StatusEndpoint {
        StatusEndpoint::for_collection(Self::ENDPOINT)
    }
}

macro_rules! task_family {
    ($(#[$meta:meta])* $name:ident, $label:literal, $endpoint:literal, $request:ty, $output:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl TaskFamily for $name {
            type Request = $request;
            type Output = $output;

            const NAME: &'static str = $label;
            const ENDPOINT: &'static str = $endpoint;
        }
    };
}

task_family!(
    TextToVideo,
    "text-to-video",
    "/v1/videos/text2video",
    TextToVideoRequest,
    VideoResult
);
task_family!(
    MultiImageToVideo,
    "multi-image-to-video",
    "/v1/videos/multi-image2video",
    MultiImageToVideoParams,
    VideoResult
);
task_family!(
    VideoExtension,
    "video-extension",
    "/v1/videos/video-extend",
    VideoExtensionRequest,
    VideoResult
);
task_family!(
    /// Talking avatar driven by speech audio.
    Avatar,
    "avatar",
    "/v1/videos/avatar/image2video",
    AvatarRequest,
    VideoResult
);
task_family!(
    /// Re-voicing a detected face. See `identify_faces` for the first step.
    LipSync,
    "lip-sync",
    "/v1/videos/advanced-lip-sync",
    LipSyncRequest,
    VideoResult
);
task_family!(VideoEffects, "video-effects", "/v1/videos/effects", VideoEffectsRequest, VideoResult);
task_family!(
    TextToAudio,
    "text-to-audio",
    "/v1/audio/text-to-audio",
    TextToAudioRequest,
    AudioResult
);
task_family!(
    VideoToAudio,
    "video-to-audio",
    "/v1/audio/video-to-audio",
    VideoToAudioRequest,
    AudioResult
);

/// Image-to-video. Multi-image requests are posted to, and polled on, the
/// multi-image endpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageToVideo;

impl TaskFamily for ImageToVideo {
    type Request = ImageToVideoRequest;
    type Output = VideoResult;

    const NAME: &'static str = "image-to-video";
    const ENDPOINT: &'static str = "/v1/videos/image2video";

    fn create_endpoint(request: &ImageToVideoRequest) -> &'static str {
        match request {
            ImageToVideoRequest::Single(_) => Self::ENDPOINT,
            ImageToVideoRequest::Multi(_) => MultiImageToVideo::ENDPOINT,
        }
    }
}

/// A freshly created task together with the endpoint it must be polled on.
#[derive(Debug, Clone)]
pub struct Submission<R> {
    task: Task<R>,
    status_endpoint: StatusEndpoint,
}

impl<R> Submission<R> {
    pub fn new(task: Task<R>, status_endpoint: StatusEndpoint) -> Self {
        Self {
            task,
            status_endpoint,
        }
    }

    pub fn task(&self) -> &Task<R> {
        &self.task
    }

    pub fn task_id(&self) -> &str {
        self.task.id()
    }

    pub fn status_endpoint(&self) -> &StatusEndpoint {
        &self.status_endpoint
    }

    pub fn into_task(self) -> Task<R> {
        self.task
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kling_proto::models::ImageInput;

    #[test]
    fn status_endpoint_follows_collection() {
        assert_eq!(
            TextToAudio::status_endpoint().template(),
            "/v1/audio/text-to-audio/{task_id}"
        );
        assert_eq!(
            LipSync::status_endpoint().render("abc").unwrap(),
            "/v1/videos/advanced-lip-sync/abc"
        );
    }

    #[test]
    fn image_to_video_routes_by_shape() {
        let single =
            ImageToVideoRequest::route(Some("https://img/a.png".into()), vec![], None).unwrap();
        assert_eq!(ImageToVideo::create_endpoint(&single), "/v1/videos/image2video");

        let multi = ImageToVideoRequest::route(
            None,
            vec![ImageInput::from("https://img/a.png"), ImageInput::from("https://img/b.png")],
            Some("two friends waving".into()),
        )
        .unwrap();
        assert_eq!(ImageToVideo::create_endpoint(&multi), "/v1/videos/multi-image2video");
    }
}
