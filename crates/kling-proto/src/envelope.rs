//! The `{code, message, request_id, data}` wrapper around every response.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{KlingError, Result};

/// Envelope `code` signalling success.
pub const CODE_OK: i64 = 0;

/// A response envelope whose `code` has already been checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl Envelope {
    /// Parses a response body and splits success from rejection.
    ///
    /// The envelope `code` decides the outcome; the HTTP status is only used
    /// to annotate bodies that are not an envelope at all.
    pub fn decode(http_status: u16, body: &[u8]) -> Result<Self> {
        let envelope: Self = serde_json::from_slice(body).map_err(|e| {
            KlingError::malformed(format!(
                "HTTP {http_status}: body is not a response envelope: {e}"
            ))
        })?;

        if envelope.code != CODE_OK {
            return Err(KlingError::Api {
                code: envelope.code,
                message: envelope.message.unwrap_or_default(),
                request_id: envelope.request_id.unwrap_or_default(),
            });
        }
        Ok(envelope)
    }

    /// The success payload. A missing or null `data` is malformed.
    pub fn into_data(self) -> Result<Value> {
        match self.data {
            Some(data) if !data.is_null() => Ok(data),
            _ => Err(KlingError::malformed(format!(
                "envelope has no data (request_id: {})",
                self.request_id.unwrap_or_default()
            ))),
        }
    }

    /// The success payload decoded as `T`.
    pub fn data_as<T: DeserializeOwned>(self) -> Result<T> {
        let data = self.into_data()?;
        serde_json::from_value(data)
            .map_err(|e| KlingError::malformed(format!("unexpected data shape: {e}")))
    }
}
