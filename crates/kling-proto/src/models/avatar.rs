use serde::{Deserialize, Serialize};

use super::{
    MAX_PROMPT_CHARS, Validate, check_count, check_non_empty, check_optional_chars, check_range,
    require_one_of,
};
use super::video::VideoMode;
use crate::error::Result;

/// Talking-avatar request for `/v1/videos/avatar/image2video`.
///
/// Speech comes from either a TTS `audio_id` or an uploaded `sound_file`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AvatarRequest {
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<VideoMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_task_id: Option<String>,
}

impl Validate for AvatarRequest {
    fn validate(&self) -> Result<()> {
        check_non_empty("image", &self.image)?;
        require_one_of(
            "audio_id, sound_file",
            self.audio_id.is_some() || self.sound_file.is_some(),
        )?;
        check_optional_chars("prompt", self.prompt.as_ref(), MAX_PROMPT_CHARS)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IdentifyFaceRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

impl Validate for IdentifyFaceRequest {
    fn validate(&self) -> Result<()> {
        require_one_of("video_id, video_url", self.video_id.is_some() || self.video_url.is_some())
    }
}

/// A face detected in the source video. Times are in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceData {
    pub face_id: String,
    pub face_image: String,
    pub start_time: i64,
    pub end_time: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifyFaceResponse {
    pub session_id: String,
    #[serde(default)]
    pub face_data: Vec<FaceData>,
}

/// Which face to drive, with what audio, and where. Times are in milliseconds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FaceChoice {
    pub face_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_file: Option<String>,
    pub sound_start_time: i64,
    pub sound_end_time: i64,
    pub sound_insert_time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_volume: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_audio_volume: Option<f64>,
}

impl Validate for FaceChoice {
    fn validate(&self) -> Result<()> {
        check_non_empty("face_id", &self.face_id)?;
        require_one_of(
            "audio_id, sound_file",
            self.audio_id.is_some() || self.sound_file.is_some(),
        )?;
        if let Some(volume) = self.sound_volume {
            check_range("sound_volume", volume, 0.0, 2.0)?;
        }
        if let Some(volume) = self.original_audio_volume {
            check_range("original_audio_volume", volume, 0.0, 2.0)?;
        }
        Ok(())
    }
}

/// Lip-sync request for `/v1/videos/advanced-lip-sync`, built from an
/// identify-face session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LipSyncRequest {
    pub session_id: String,
    pub face_choose: Vec<FaceChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
}

impl Validate for LipSyncRequest {
    fn validate(&self) -> Result<()> {
        check_non_empty("session_id", &self.session_id)?;
        check_count("face_choose", self.face_choose.len(), 1, 1)?;
        self.face_choose.iter().try_for_each(Validate::validate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn choice() -> FaceChoice {
        FaceChoice {
            face_id: "face-0".to_string(),
            audio_id: Some("audio-1".to_string()),
            sound_end_time: 5000,
            ..FaceChoice::default()
        }
    }

    #[test]
    fn avatar_requires_audio_source() {
        let request = AvatarRequest {
            image: "face.jpg".to_string(),
            ..AvatarRequest::default()
        };
        assert!(request.validate().is_err());

        let request = AvatarRequest {
            sound_file: Some("speech.mp3".to_string()),
            ..request
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn lip_sync_takes_exactly_one_face() {
        let mut request = LipSyncRequest {
            session_id: "session-1".to_string(),
            face_choose: vec![choice()],
            callback_url: None,
        };
        assert!(request.validate().is_ok());

        request.face_choose.push(choice());
        assert!(request.validate().is_err());

        request.face_choose.clear();
        assert!(request.validate().is_err());
    }

    #[test]
    fn volume_bounds() {
        let request = LipSyncRequest {
            session_id: "session-1".to_string(),
            face_choose: vec![FaceChoice {
                sound_volume: Some(2.5),
                ..choice()
            }],
            callback_url: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn identify_face_response_decodes() {
        let response: IdentifyFaceResponse = serde_json::from_value(json!({
            "session_id": "session-1",
            "face_data": [
                {
                    "face_id": "0",
                    "face_image": "https://cdn.example.com/0.png",
                    "start_time": 0,
                    "end_time": 5200
                }
            ]
        }))
        .unwrap();
        assert_eq!(response.face_data.len(), 1);
        assert_eq!(response.face_data[0].end_time, 5200);
    }

    #[test]
    fn identify_face_needs_a_video() {
        assert!(IdentifyFaceRequest::default().validate().is_err());
    }
}
