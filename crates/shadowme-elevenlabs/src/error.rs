//! Internal error types for ElevenLabs operations.
//!
//! These errors are internal to `shadowme-elevenlabs` and are mapped to core
//! port errors at the boundary.

use thiserror::Error;

/// Result type alias for ElevenLabs operations.
pub type ElevenLabsResult<T> = Result<T, ElevenLabsError>;

/// Errors related to ElevenLabs API operations.
#[derive(Debug, Error)]
pub enum ElevenLabsError {
    /// API request failed with an HTTP error status.
    #[error("ElevenLabs API request failed with status {status}: {body}")]
    ApiRequestFailed { status: u16, body: String },

    /// The account cannot hold another cloned voice.
    #[error("ElevenLabs voice limit reached: {body}")]
    VoiceLimitReached { body: String },

    #[error("Invalid response from ElevenLabs API: {message}")]
    InvalidResponse { message: String },

    #[error("ElevenLabs API key is not configured")]
    MissingApiKey,

    #[error("ElevenLabs request timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },

    /// Network or HTTP client error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),
}
