//! Error types for the portman-core library.

use thiserror::Error;

/// Result type alias for portman operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while scanning ports or loading configuration.
///
/// Process termination never produces one of these; its failures are
/// folded into a [`KillOutcome`](crate::domain::KillOutcome).
#[derive(Error, Debug)]
pub enum Error {
    /// The host operating system has no scan strategy.
    #[error("Platform not supported: {0}")]
    UnsupportedPlatform(String),

    /// The inspection tool could not be run or reported a failure.
    #[error("Command execution failed: {0}")]
    ToolExecution(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
