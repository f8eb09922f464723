//! Client configuration from code, `KLING_*` environment variables or YAML.

use std::env;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use kling_proto::{KlingError, Result};
use serde::{Deserialize, Serialize};

use crate::auth::Credentials;
use crate::waiter::WaitOptions;

pub const DEFAULT_BASE_URL: &str = "https://api-singapore.klingai.com";
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_POLL_INTERVAL_SECONDS: f64 = 5.0;
pub const DEFAULT_POLL_TIMEOUT_SECONDS: u64 = 600;

/// Polling cadence and budget used by `wait_for_completion`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollSettings {
    #[serde(default = "default_poll_interval")]
    pub interval_seconds: f64,
    /// `0` waits without a deadline.
    #[serde(default = "default_poll_timeout")]
    pub timeout_seconds: u64,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_seconds: DEFAULT_POLL_INTERVAL_SECONDS,
            timeout_seconds: DEFAULT_POLL_TIMEOUT_SECONDS,
        }
    }
}

impl PollSettings {
    /// Validated wait options. Fails if the interval is not strictly positive.
    pub fn wait_options(&self) -> Result<WaitOptions> {
        WaitOptions::from_secs_f64(self.interval_seconds, self.timeout_seconds as f64)
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct KlingConfig {
    pub access_key: String,
    pub secret_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default)]
    pub poll: PollSettings,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECONDS
}

fn default_poll_interval() -> f64 {
    DEFAULT_POLL_INTERVAL_SECONDS
}

fn default_poll_timeout() -> u64 {
    DEFAULT_POLL_TIMEOUT_SECONDS
}

impl KlingConfig {
    /// Create a configuration with explicit keys and default settings.
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            base_url: default_base_url(),
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECONDS,
            poll: PollSettings::default(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is read first if present.
    pub fn from_env() -> Result<Self> {
        // Missing .env is fine
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| KlingError::Config(format!("{name} not set")))
        };

        let mut config = Self::new(required("KLING_ACCESS_KEY")?, required("KLING_SECRET_KEY")?);

        if let Some(base_url) = lookup("KLING_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(raw) = lookup("KLING_REQUEST_TIMEOUT_SECONDS") {
            config.request_timeout_seconds = parse_number("KLING_REQUEST_TIMEOUT_SECONDS", &raw)?;
        }
        if let Some(raw) = lookup("KLING_POLL_INTERVAL_SECONDS") {
            config.poll.interval_seconds = parse_number("KLING_POLL_INTERVAL_SECONDS", &raw)?;
        }
        if let Some(raw) = lookup("KLING_POLL_TIMEOUT_SECONDS") {
            config.poll.timeout_seconds = parse_number("KLING_POLL_TIMEOUT_SECONDS", &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| KlingError::Config(format!("invalid YAML config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| KlingError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_yaml_str(&yaml)
    }

    pub fn validate(&self) -> Result<()> {
        if self.access_key.trim().is_empty() || self.secret_key.trim().is_empty() {
            return Err(KlingError::Config(
                "access_key and secret_key must not be empty".to_string(),
            ));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(KlingError::Config(format!(
                "base_url must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }
        if self.request_timeout_seconds == 0 {
            return Err(KlingError::Config(
                "request_timeout_seconds must be greater than zero".to_string(),
            ));
        }
        self.poll.wait_options().map(|_| ())
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.access_key, &self.secret_key)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl fmt::Debug for KlingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KlingConfig")
            .field("credentials", &self.credentials())
            .field("base_url", &self.base_url)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("poll", &self.poll)
            .finish()
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| KlingError::Config(format!("{name} is not a valid number: {raw:?}")))
}
