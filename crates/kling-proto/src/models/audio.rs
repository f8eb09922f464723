use serde::{Deserialize, Serialize};

use super::{
    Validate, check_max_chars, check_non_empty, check_optional_chars, check_range, require_one_of,
};
use crate::error::Result;

const MAX_AUDIO_PROMPT_CHARS: usize = 200;
const MAX_TTS_CHARS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextToAudioRequest {
    pub prompt: String,
    /// Seconds, `3.0..=10.0`.
    pub duration: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_task_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
}

impl Validate for TextToAudioRequest {
    fn validate(&self) -> Result<()> {
        check_non_empty("prompt", &self.prompt)?;
        check_max_chars("prompt", &self.prompt, MAX_AUDIO_PROMPT_CHARS)?;
        check_range("duration", self.duration, 3.0, 10.0)
    }
}

/// Generates a soundtrack for an existing video.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VideoToAudioRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_effect_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bgm_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asmr_mode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_task_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
}

impl Validate for VideoToAudioRequest {
    fn validate(&self) -> Result<()> {
        require_one_of("video_id, video_url", self.video_id.is_some() || self.video_url.is_some())?;
        check_optional_chars(
            "sound_effect_prompt",
            self.sound_effect_prompt.as_ref(),
            MAX_AUDIO_PROMPT_CHARS,
        )?;
        check_optional_chars("bgm_prompt", self.bgm_prompt.as_ref(), MAX_AUDIO_PROMPT_CHARS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceLanguage {
    Zh,
    En,
}

/// Text-to-speech request. The service answers synchronously.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TtsRequest {
    pub text: String,
    pub voice_id: String,
    pub voice_language: VoiceLanguage,
    /// Speech rate, `0.8..=2.0`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_speed: Option<f64>,
}

impl TtsRequest {
    pub fn new(
        text: impl Into<String>,
        voice_id: impl Into<String>,
        voice_language: VoiceLanguage,
    ) -> Self {
        Self {
            text: text.into(),
            voice_id: voice_id.into(),
            voice_language,
            voice_speed: None,
        }
    }
}

impl Validate for TtsRequest {
    fn validate(&self) -> Result<()> {
        check_non_empty("text", &self.text)?;
        check_max_chars("text", &self.text, MAX_TTS_CHARS)?;
        check_non_empty("voice_id", &self.voice_id)?;
        if let Some(speed) = self.voice_speed {
            check_range("voice_speed", speed, 0.8, 2.0)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Audio {
    pub id: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

/// `task_result` of every audio-producing family.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AudioResult {
    #[serde(default)]
    pub audios: Vec<Audio>,
}
