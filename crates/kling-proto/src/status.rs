//! Normalized task status and the wire vocabulary that maps onto it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{KlingError, Result};

/// Lifecycle state of a remote generation task.
///
/// `Succeeded` and `Failed` are terminal; polling stops on either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Submitted,
    Running,
    Succeeded,
    Failed,
}

/// Every spelling the service is known to emit, and what it means.
///
/// Anything not listed here is a protocol mismatch, not a guess.
const WIRE_VOCABULARY: &[(&str, TaskStatus)] = &[
    ("submitted", TaskStatus::Submitted),
    ("pending", TaskStatus::Submitted),
    ("processing", TaskStatus::Running),
    ("running", TaskStatus::Running),
    ("succeed", TaskStatus::Succeeded),
    ("succeeded", TaskStatus::Succeeded),
    ("failed", TaskStatus::Failed),
];

impl TaskStatus {
    /// Maps a `task_status` value from the wire to the normalized state.
    pub fn from_wire(value: &str) -> Result<Self> {
        WIRE_VOCABULARY
            .iter()
            .find(|(spelling, _)| *spelling == value)
            .map(|(_, status)| *status)
            .ok_or_else(|| KlingError::malformed(format!("unrecognized task_status {value:?}")))
    }

    /// The canonical spelling the service uses for this state.
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Running => "processing",
            Self::Succeeded => "succeed",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Submitted => "submitted",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn maps_known_spellings() {
        assert_eq!(TaskStatus::from_wire("submitted").unwrap(), TaskStatus::Submitted);
        assert_eq!(TaskStatus::from_wire("pending").unwrap(), TaskStatus::Submitted);
        assert_eq!(TaskStatus::from_wire("processing").unwrap(), TaskStatus::Running);
        assert_eq!(TaskStatus::from_wire("succeed").unwrap(), TaskStatus::Succeeded);
        assert_eq!(TaskStatus::from_wire("failed").unwrap(), TaskStatus::Failed);
    }

    #[test]
    fn unknown_spelling_is_malformed() {
        for value in ["SUCCEED", "done", "", "cancelled"] {
            let err = TaskStatus::from_wire(value).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedResponse, "{value:?}");
        }
    }

    #[test]
    fn canonical_spelling_maps_back() {
        for status in [
            TaskStatus::Submitted,
            TaskStatus::Running,
            TaskStatus::Succeeded,
            TaskStatus::Failed,
        ] {
            assert_eq!(TaskStatus::from_wire(status.as_wire()).unwrap(), status);
        }
    }

    #[test]
    fn terminal_states() {
        assert!(TaskStatus::Succeeded.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(!TaskStatus::Submitted.is_terminal());
        assert!(!TaskStatus::Running.is_terminal());
    }
}
