//! Error types for jotwise.

use thiserror::Error;

/// Result type alias using jotwise's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for jotwise operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Note not found (or not owned by the caller)
    #[error("Note not found: {0}")]
    NoteNotFound(uuid::Uuid),

    /// The completion transport failed: non-success status or a dropped
    /// connection while streaming.
    #[error("{message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// A streamed byte sequence could not be decoded as UTF-8
    #[error("Decode error: {0}")]
    Decode(String),

    /// Inference/generation failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Operation conflicts with one already in progress
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Authentication failed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl Error {
    /// Build a transport error for a non-success HTTP status.
    pub fn transport_status(status: u16, message: impl Into<String>) -> Self {
        Error::Transport {
            status: Some(status),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
