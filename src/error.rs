// file: src/error.rs
// version: 3.1.0
// guid: 57b83a63-07b6-4534-aa6c-51e8797254e0

use thiserror::Error;

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Error types for the bridge setup
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Command '{command}' failed (exit code {exit_code:?}): {stderr}")]
    Process {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Permission denied: {0}")]
    Permission(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Prerequisite refused: {0}")]
    Prerequisite(String),

    #[error("Overlay network error: {0}")]
    Overlay(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl BridgeError {
    /// Create a new process error
    pub fn process(
        command: impl Into<String>,
        exit_code: Option<i32>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::Process {
            command: command.into(),
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Create a new permission error
    pub fn permission(msg: impl Into<String>) -> Self {
        Self::Permission(msg.into())
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new refused-prerequisite error
    pub fn prerequisite(msg: impl Into<String>) -> Self {
        Self::Prerequisite(msg.into())
    }

    /// Create a new overlay network error
    pub fn overlay(msg: impl Into<String>) -> Self {
        Self::Overlay(msg.into())
    }

    /// Create a new network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a new cancellation error
    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }
}
