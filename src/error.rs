//! Error types for the drive_scribe crate.

use thiserror::Error;

/// Errors that can occur while downloading or transcribing Drive media.
#[derive(Error, Debug)]
pub enum ScribeError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Invalid Drive URL or ID: {0}")]
    InvalidReference(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transcription failed: {0}")]
    Transcription(String),
}

/// Result type alias for ScribeError.
pub type Result<T> = std::result::Result<T, ScribeError>;
