use serde::{Deserialize, Serialize};

use super::{
    MAX_PROMPT_CHARS, Validate, check_count, check_max_chars, check_non_empty,
    check_optional_chars, check_range, require_one_of,
};
use crate::error::{KlingError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoMode {
    #[default]
    Std,
    Pro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "1:1")]
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VideoDuration {
    #[default]
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "10")]
    Ten,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraControlType {
    Simple,
    DownBack,
    ForwardUp,
    RightTurnForward,
    LeftTurnForward,
}

/// Camera movement amounts, each in `-10..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(default)]
    pub horizontal: f64,
    #[serde(default)]
    pub vertical: f64,
    #[serde(default)]
    pub pan: f64,
    #[serde(default)]
    pub tilt: f64,
    #[serde(default)]
    pub roll: f64,
    #[serde(default)]
    pub zoom: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraControl {
    #[serde(rename = "type")]
    pub control_type: CameraControlType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<CameraConfig>,
}

impl Validate for CameraControl {
    fn validate(&self) -> Result<()> {
        let Some(config) = &self.config else {
            if self.control_type == CameraControlType::Simple {
                return Err(KlingError::validation(
                    "camera_control.config is required for the simple camera type",
                ));
            }
            return Ok(());
        };
        for (name, value) in [
            ("horizontal", config.horizontal),
            ("vertical", config.vertical),
            ("pan", config.pan),
            ("tilt", config.tilt),
            ("roll", config.roll),
            ("zoom", config.zoom),
        ] {
            check_range(&format!("camera_control.config.{name}"), value, -10.0, 10.0)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub x: i32,
    pub y: i32,
}

/// A motion brush: a mask and the path it should follow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicMask {
    pub mask: String,
    pub trajectories: Vec<TrajectoryPoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInput {
    pub image: String,
}

impl From<String> for ImageInput {
    fn from(image: String) -> Self {
        Self { image }
    }
}

impl From<&str> for ImageInput {
    fn from(image: &str) -> Self {
        Self {
            image: image.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextToVideoRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cfg_scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<VideoMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera_control: Option<CameraControl>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<AspectRatio>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<VideoDuration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_task_id: Option<String>,
}

impl TextToVideoRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }
}

impl Validate for TextToVideoRequest {
    fn validate(&self) -> Result<()> {
        check_non_empty("prompt", &self.prompt)?;
        check_max_chars("prompt", &self.prompt, MAX_PROMPT_CHARS)?;
        check_optional_chars("negative_prompt", self.negative_prompt.as_ref(), MAX_PROMPT_CHARS)?;
        if let Some(cfg_scale) = self.cfg_scale {
            check_range("cfg_scale", cfg_scale, 0.0, 1.0)?;
        }
        if let Some(camera) = &self.camera_control {
            camera.validate()?;
        }
        Ok(())
    }
}

/// Single-image request for `/v1/videos/image2video`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageToVideoParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_tail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cfg_scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<VideoMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_mask: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamic_masks: Option<Vec<DynamicMask>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera_control: Option<CameraControl>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<VideoDuration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_task_id: Option<String>,
}

impl Validate for ImageToVideoParams {
    fn validate(&self) -> Result<()> {
        require_one_of("image, image_tail", self.image.is_some() || self.image_tail.is_some())?;
        check_optional_chars("prompt", self.prompt.as_ref(), MAX_PROMPT_CHARS)?;
        check_optional_chars("negative_prompt", self.negative_prompt.as_ref(), MAX_PROMPT_CHARS)?;
        if let Some(cfg_scale) = self.cfg_scale {
            check_range("cfg_scale", cfg_scale, 0.0, 1.0)?;
        }
        if let Some(masks) = &self.dynamic_masks {
            check_count("dynamic_masks", masks.len(), 0, 6)?;
            for mask in masks {
                check_count("dynamic_masks.trajectories", mask.trajectories.len(), 2, 77)?;
            }
        }
        if let Some(camera) = &self.camera_control {
            camera.validate()?;
        }
        Ok(())
    }
}

/// Multi-image ("elements") request for `/v1/videos/multi-image2video`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MultiImageToVideoParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    pub image_list: Vec<ImageInput>,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<VideoMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<VideoDuration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<AspectRatio>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_task_id: Option<String>,
}

impl Validate for MultiImageToVideoParams {
    fn validate(&self) -> Result<()> {
        check_count("image_list", self.image_list.len(), 1, 4)?;
        check_non_empty("prompt", &self.prompt)?;
        check_max_chars("prompt", &self.prompt, MAX_PROMPT_CHARS)?;
        check_optional_chars("negative_prompt", self.negative_prompt.as_ref(), MAX_PROMPT_CHARS)
    }
}

/// An image-to-video request, routed by which input the caller supplied.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ImageToVideoRequest {
    Single(ImageToVideoParams),
    Multi(MultiImageToVideoParams),
}

impl ImageToVideoRequest {
    /// Picks the request shape: a non-empty `images` list means multi-image,
    /// otherwise `image` is used.
    pub fn route(
        image: Option<String>,
        images: Vec<ImageInput>,
        prompt: Option<String>,
    ) -> Result<Self> {
        if !images.is_empty() {
            let prompt = prompt.ok_or_else(|| {
                KlingError::validation("prompt is required for multi-image requests")
            })?;
            return Ok(Self::Multi(MultiImageToVideoParams {
                image_list: images,
                prompt,
                ..MultiImageToVideoParams::default()
            }));
        }
        let image =
            image.ok_or_else(|| KlingError::validation("one of image, images is required"))?;
        Ok(Self::Single(ImageToVideoParams {
            image: Some(image),
            prompt,
            ..ImageToVideoParams::default()
        }))
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, Self::Multi(_))
    }
}

impl From<ImageToVideoParams> for ImageToVideoRequest {
    fn from(params: ImageToVideoParams) -> Self {
        Self::Single(params)
    }
}

impl From<MultiImageToVideoParams> for ImageToVideoRequest {
    fn from(params: MultiImageToVideoParams) -> Self {
        Self::Multi(params)
    }
}

impl Validate for ImageToVideoRequest {
    fn validate(&self) -> Result<()> {
        match self {
            Self::Single(params) => params.validate(),
            Self::Multi(params) => params.validate(),
        }
    }
}

/// Extends a previously generated video by a few seconds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VideoExtensionRequest {
    pub video_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cfg_scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
}

impl Validate for VideoExtensionRequest {
    fn validate(&self) -> Result<()> {
        check_non_empty("video_id", &self.video_id)?;
        check_optional_chars("prompt", self.prompt.as_ref(), MAX_PROMPT_CHARS)?;
        check_optional_chars("negative_prompt", self.negative_prompt.as_ref(), MAX_PROMPT_CHARS)?;
        if let Some(cfg_scale) = self.cfg_scale {
            check_range("cfg_scale", cfg_scale, 0.0, 1.0)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

/// `task_result` of every video-producing family.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VideoResult {
    #[serde(default)]
    pub videos: Vec<Video>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn text_to_video_omits_unset_fields() {
        let request = TextToVideoRequest {
            model_name: Some("kling-v2-1-master".to_string()),
            duration: Some(VideoDuration::Ten),
            aspect_ratio: Some(AspectRatio::Portrait),
            ..TextToVideoRequest::new("A cat playing piano")
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model_name": "kling-v2-1-master",
                "prompt": "A cat playing piano",
                "aspect_ratio": "9:16",
                "duration": "10"
            })
        );
    }

    #[test]
    fn prompt_limit_counts_characters() {
        let request = TextToVideoRequest::new("é".repeat(MAX_PROMPT_CHARS));
        assert!(request.validate().is_ok());

        let request = TextToVideoRequest::new("a".repeat(MAX_PROMPT_CHARS + 1));
        assert_eq!(request.validate().unwrap_err().kind(), ErrorKind::Validation);
    }

    #[test]
    fn cfg_scale_out_of_range_rejected() {
        let request = TextToVideoRequest {
            cfg_scale: Some(1.5),
            ..TextToVideoRequest::new("x")
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn route_prefers_images_list() {
        let request = ImageToVideoRequest::route(
            Some("ignored.jpg".to_string()),
            vec!["a.jpg".into(), "b.jpg".into()],
            Some("Two people meeting".to_string()),
        )
        .unwrap();
        assert!(request.is_multi());
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "image_list": [{"image": "a.jpg"}, {"image": "b.jpg"}],
                "prompt": "Two people meeting"
            })
        );
    }

    #[test]
    fn route_falls_back_to_single_image() {
        let request =
            ImageToVideoRequest::route(Some("face.jpg".to_string()), Vec::new(), None).unwrap();
        assert!(!request.is_multi());
        assert_eq!(serde_json::to_value(&request).unwrap(), json!({"image": "face.jpg"}));
    }

    #[test]
    fn route_without_any_image_fails() {
        let err = ImageToVideoRequest::route(None, Vec::new(), Some("p".to_string())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn multi_image_limits() {
        let params = MultiImageToVideoParams {
            image_list: (0..5).map(|i| ImageInput::from(format!("{i}.jpg"))).collect(),
            prompt: "p".to_string(),
            ..MultiImageToVideoParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn dynamic_mask_trajectory_bounds() {
        let params = ImageToVideoParams {
            image: Some("a.jpg".to_string()),
            dynamic_masks: Some(vec![DynamicMask {
                mask: "mask.png".to_string(),
                trajectories: vec![TrajectoryPoint { x: 1, y: 1 }],
            }]),
            ..ImageToVideoParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn simple_camera_needs_config() {
        let camera = CameraControl {
            control_type: CameraControlType::Simple,
            config: None,
        };
        assert!(camera.validate().is_err());

        let camera = CameraControl {
            control_type: CameraControlType::Simple,
            config: Some(CameraConfig {
                zoom: 5.0,
                ..CameraConfig::default()
            }),
        };
        assert!(camera.validate().is_ok());
        assert_eq!(serde_json::to_value(&camera).unwrap()["type"], "simple");
    }
}
