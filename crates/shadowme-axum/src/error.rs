//! Axum-specific error types and mappings.
//!
//! Maps `CoreError`, `RepositoryError`, `ProviderError` and `SynthesisError`
//! to HTTP status codes and a JSON body of the form `{ error, status }`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use shadowme_core::{
    CoreError, ProviderError, RepositoryError, SynthesisError, TERMINAL_FAILURE_MESSAGE,
};

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request (invalid input).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Service unavailable (e.g., voice provider down).
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HttpError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::NotFound(msg)
            | Self::BadRequest(msg)
            | Self::ServiceUnavailable(msg)
            | Self::Internal(msg) => msg,
        };

        let body = ErrorBody {
            error: message,
            status: status.as_u16(),
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<CoreError> for HttpError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Repository(repo_err) => repo_err.into(),
            CoreError::Provider(provider_err) => provider_err.into(),
            CoreError::Config(config_err) => Self::Internal(format!("Config: {config_err}")),
            CoreError::Validation(msg) => Self::BadRequest(msg),
            CoreError::NotFound(msg) => Self::NotFound(msg),
        }
    }
}

impl From<RepositoryError> for HttpError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => Self::NotFound(msg),
            RepositoryError::Storage(msg) => Self::Internal(format!("Storage: {msg}")),
            RepositoryError::Serialization(msg) => Self::Internal(format!("Serialization: {msg}")),
            RepositoryError::Constraint(msg) => Self::BadRequest(msg),
        }
    }
}

impl From<ProviderError> for HttpError {
    fn from(err: ProviderError) -> Self {
        if err.is_transient() {
            Self::ServiceUnavailable(err.to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}

impl From<SynthesisError> for HttpError {
    fn from(err: SynthesisError) -> Self {
        match err {
            SynthesisError::Validation(msg) => Self::BadRequest(msg),
            SynthesisError::Terminal { source, .. } => {
                error!(
                    target: "shadowme.synthesis",
                    error = %source,
                    "Terminal synthesis failure"
                );
                Self::Internal(TERMINAL_FAILURE_MESSAGE.to_string())
            }
        }
    }
}
