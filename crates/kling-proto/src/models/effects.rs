use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::video::VideoMode;
use super::{Validate, check_count, check_non_empty};
use crate::error::Result;

/// Effect input. The accepted shape depends on the effect scene, so
/// scenes the SDK does not model can still be sent as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EffectInput {
    /// Dual-character scenes such as `hug` or `kiss`: left and right image.
    DualCharacter {
        #[serde(skip_serializing_if = "Option::is_none")]
        model_name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        mode: Option<VideoMode>,
        images: Vec<String>,
        duration: String,
    },
    /// Single-image scenes such as `pet_lion`.
    SingleImage { image: String, duration: String },
    Custom(Map<String, Value>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoEffectsRequest {
    pub effect_scene: String,
    pub input: EffectInput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_task_id: Option<String>,
}

impl VideoEffectsRequest {
    pub fn new(effect_scene: impl Into<String>, input: EffectInput) -> Self {
        Self {
            effect_scene: effect_scene.into(),
            input,
            callback_url: None,
            external_task_id: None,
        }
    }
}

impl Validate for VideoEffectsRequest {
    fn validate(&self) -> Result<()> {
        check_non_empty("effect_scene", &self.effect_scene)?;
        match &self.input {
            EffectInput::DualCharacter { images, .. } => {
                check_count("input.images", images.len(), 2, 2)
            }
            EffectInput::SingleImage { image, .. } => check_non_empty("input.image", image),
            EffectInput::Custom(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_image_effect_shape() {
        let request = VideoEffectsRequest::new(
            "pet_lion",
            EffectInput::SingleImage {
                image: "cat.jpg".to_string(),
                duration: "5".to_string(),
            },
        );
        assert!(request.validate().is_ok());
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"effect_scene": "pet_lion", "input": {"image": "cat.jpg", "duration": "5"}})
        );
    }

    #[test]
    fn dual_character_needs_two_images() {
        let request = VideoEffectsRequest::new(
            "hug",
            EffectInput::DualCharacter {
                model_name: Some("kling-v1-6".to_string()),
                mode: Some(VideoMode::Std),
                images: vec!["left.jpg".to_string()],
                duration: "5".to_string(),
            },
        );
        assert!(request.validate().is_err());
    }

    #[test]
    fn custom_input_passes_through() {
        let input: EffectInput =
            serde_json::from_value(json!({"image": "x.jpg", "style": "anime"})).unwrap();
        assert!(matches!(input, EffectInput::Custom(_)));
    }
}
