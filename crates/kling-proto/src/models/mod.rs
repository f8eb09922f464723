//! Request and result records for each job family.
//!
//! Request records serialize with `None` fields omitted. [`Validate`] checks
//! the documented service limits before a request leaves the process.

mod audio;
mod avatar;
mod effects;
mod video;

pub use audio::{
    Audio, AudioResult, TextToAudioRequest, TtsRequest, VideoToAudioRequest, VoiceLanguage,
};
pub use avatar::{
    AvatarRequest, FaceChoice, FaceData, IdentifyFaceRequest, IdentifyFaceResponse, LipSyncRequest,
};
pub use effects::{EffectInput, VideoEffectsRequest};
pub use video::{
    AspectRatio, CameraConfig, CameraControl, CameraControlType, DynamicMask, ImageInput,
    ImageToVideoParams, ImageToVideoRequest, MultiImageToVideoParams, TextToVideoRequest,
    TrajectoryPoint, Video, VideoDuration, VideoExtensionRequest, VideoMode, VideoResult,
};

use crate::error::{KlingError, Result};

/// Upper bound on video prompts and negative prompts, in characters.
pub const MAX_PROMPT_CHARS: usize = 2500;

/// Client-side checks run before a request is sent.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub(crate) fn check_max_chars(field: &str, value: &str, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max {
        return Err(KlingError::validation(format!(
            "{field} is {len} characters, limit is {max}"
        )));
    }
    Ok(())
}

pub(crate) fn check_optional_chars(field: &str, value: Option<&String>, max: usize) -> Result<()> {
    value.map_or(Ok(()), |v| check_max_chars(field, v, max))
}

pub(crate) fn check_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(KlingError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

pub(crate) fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if !(min..=max).contains(&value) {
        return Err(KlingError::validation(format!(
            "{field} must be within {min}..={max}, got {value}"
        )));
    }
    Ok(())
}

pub(crate) fn check_count(field: &str, count: usize, min: usize, max: usize) -> Result<()> {
    if !(min..=max).contains(&count) {
        return Err(KlingError::validation(format!(
            "{field} must contain {min}..={max} entries, got {count}"
        )));
    }
    Ok(())
}

pub(crate) fn require_one_of(fields: &str, present: bool) -> Result<()> {
    if !present {
        return Err(KlingError::validation(format!("one of {fields} is required")));
    }
    Ok(())
}
