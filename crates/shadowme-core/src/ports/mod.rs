//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `sqlx` or `reqwest` types in any signature
//! - Provider failures are expressed as [`ProviderError`] only
//! - Repository traits are minimal and keyed the way the data is read

pub mod clock;
pub mod progress_repository;
pub mod voice_provider;

use thiserror::Error;

pub use clock::{Clock, SystemClock};
pub use progress_repository::ProgressRepository;
pub use voice_provider::{
    CloneRequest, ProviderError, ProviderResult, ProviderVoice, SynthesizedAudio, VoiceProfile,
    VoiceProviderPort, VoiceSettings,
};

/// Domain-specific errors for repository operations.
///
/// This error type abstracts away storage implementation details (e.g., sqlx errors)
/// and provides a clean interface for services to handle storage failures.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The requested entity was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Storage backend error (database, filesystem, etc.).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A constraint was violated (e.g., unique constraint).
    #[error("Constraint violation: {0}")]
    Constraint(String),
}

/// Core error type for semantic domain errors.
///
/// Adapters map this to their own error types (HTTP status codes, CLI exit
/// codes).
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// Validation error (invalid input).
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),
}
