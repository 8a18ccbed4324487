//! Error types for notavoz.

use thiserror::Error;

/// Result type alias using notavoz's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for notavoz operations.
///
/// Each variant maps to one failure class of the ingestion pipeline. The API
/// boundary translates these into HTTP statuses; upstream detail strings are
/// preserved here (and in logs) but 500-class responses only carry a generic
/// message.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Authentication failed (missing or invalid credential)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Invalid input (missing required field, empty payload)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Request body encoding is neither multipart nor JSON
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Object storage upload or delete failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Speech-to-text service reported a job failure
    #[error("Transcription error: {0}")]
    Transcription(String),

    /// Transcription completed but contained no speech
    #[error("No speech was detected in the audio")]
    EmptyTranscript,

    /// Transcription job did not reach a terminal status in time
    #[error("Transcription did not finish within {0} seconds")]
    TranscriptionTimeout(u64),

    /// Language-model title synthesis failed
    #[error("Title generation error: {0}")]
    TitleGeneration(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
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
