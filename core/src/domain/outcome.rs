//! Result of a termination attempt.

use serde::{Deserialize, Serialize};

/// Outcome of killing one process.
///
/// The message is always set and is meant for the operator, both for
/// success narration and failure detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillOutcome {
    pub success: bool,
    pub message: String,
}

impl KillOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for KillOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mark = if self.success { "✓" } else { "✗" };
        write!(f, "{} {}", mark, self.message)
    }
}
