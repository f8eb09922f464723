use std::time::Duration;

use thiserror::Error;

use crate::status::TaskStatus;

/// Boxed source error carried by [`KlingError::Transport`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for Kling SDK operations.
pub type Result<T> = std::result::Result<T, KlingError>;

/// Errors that can occur while talking to the Kling API or waiting on a task.
#[derive(Debug, Error)]
pub enum KlingError {
    /// Network or connection failure. Never retried by the SDK.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// The response body or status vocabulary could not be decoded.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The service rejected the call with a non-zero envelope code.
    #[error("[{code}] {message} (request_id: {request_id})")]
    Api {
        code: i64,
        message: String,
        request_id: String,
    },

    /// The task reached the terminal `failed` state.
    #[error("task {task_id} failed: {message}")]
    TaskFailed { task_id: String, message: String },

    /// The wait deadline elapsed while the task was still in flight.
    #[error(
        "task {task_id} did not complete within {timeout:?} \
         (elapsed {elapsed:?}, last status {last_status})"
    )]
    Timeout {
        task_id: String,
        timeout: Duration,
        elapsed: Duration,
        last_status: TaskStatus,
    },

    /// Invalid client or wait configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A request record was rejected before it was sent.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The authorization token could not be produced.
    #[error("authentication error: {0}")]
    Auth(String),
}

/// Coarse classification of a [`KlingError`], for matching without
/// destructuring every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    MalformedResponse,
    Api,
    TaskFailed,
    Timeout,
    Config,
    Validation,
    Auth,
}

impl KlingError {
    /// Wraps any error as a transport failure, keeping it as `source()`.
    pub fn transport(err: impl Into<BoxError>) -> Self {
        Self::Transport(err.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) => ErrorKind::Transport,
            Self::MalformedResponse(_) => ErrorKind::MalformedResponse,
            Self::Api { .. } => ErrorKind::Api,
            Self::TaskFailed { .. } => ErrorKind::TaskFailed,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Config(_) => ErrorKind::Config,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Auth(_) => ErrorKind::Auth,
        }
    }

    /// Whether calling `wait` again for the same task is meaningful.
    ///
    /// Only timeouts qualify: the task is still alive server-side.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn api_error_display_matches_envelope_fields() {
        let err = KlingError::Api {
            code: 1102,
            message: "balance not enough".to_string(),
            request_id: "req-42".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "[1102] balance not enough (request_id: req-42)"
        );
        assert_eq!(err.kind(), ErrorKind::Api);
        assert!(!err.is_retryable());
    }

    #[test]
    fn transport_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let err = KlingError::transport(io);
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.source().unwrap().to_string().contains("reset by peer"));
    }

    #[test]
    fn only_timeout_is_retryable() {
        let timeout = KlingError::Timeout {
            task_id: "t-1".to_string(),
            timeout: Duration::from_secs(3),
            elapsed: Duration::from_secs(3),
            last_status: TaskStatus::Running,
        };
        assert!(timeout.is_retryable());
        assert_eq!(
            timeout.to_string(),
            "task t-1 did not complete within 3s (elapsed 3s, last status running)"
        );

        let failed = KlingError::TaskFailed {
            task_id: "t-1".to_string(),
            message: "insufficient credits".to_string(),
        };
        assert!(!failed.is_retryable());
        assert_eq!(failed.kind(), ErrorKind::TaskFailed);
    }
}
