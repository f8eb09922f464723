//! Access-key/secret-key credentials and the short-lived JWT the API expects.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use kling_proto::{KlingError, Result};
use serde_json::json;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Lifetime of a signed token, in seconds.
const TOKEN_TTL_SECS: i64 = 1800;
/// Backdating applied to `nbf` to tolerate clock skew.
const NOT_BEFORE_SKEW_SECS: i64 = 5;

const JWT_HEADER: &[u8] = br#"{"alg":"HS256","typ":"JWT"}"#;

#[derive(Clone)]
pub struct Credentials {
    access_key: String,
    secret_key: String,
}

impl Credentials {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// Signs a fresh HS256 token valid from now.
    pub fn token(&self) -> Result<String> {
        self.token_at(chrono::Utc::now().timestamp())
    }

    /// Signs a token as if the current time were `now` (Unix seconds).
    pub fn token_at(&self, now: i64) -> Result<String> {
        let claims = json!({
            "iss": self.access_key,
            "exp": now + TOKEN_TTL_SECS,
            "nbf": now - NOT_BEFORE_SKEW_SECS,
        });
        let claims = serde_json::to_vec(&claims)
            .map_err(|e| KlingError::Auth(format!("failed to encode claims: {e}")))?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(JWT_HEADER),
            URL_SAFE_NO_PAD.encode(claims)
        );

        let mut mac = HmacSha256::new_from_slice(self.secret_key.as_bytes())
            .map_err(|e| KlingError::Auth(format!("invalid secret key: {e}")))?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{signing_input}.{signature}"))
    }

    /// The `Authorization` header value for one request.
    pub fn authorization(&self) -> Result<String> {
        Ok(format!("Bearer {}", self.token()?))
    }

    fn secret_masked(&self) -> String {
        let chars: Vec<char> = self.secret_key.chars().collect();
        if chars.len() > 8 {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("{head}...{tail}")
        } else {
            "****".to_string()
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &self.secret_masked())
            .finish()
    }
}
