//! HTTP adapter for ShadowME.
//!
//! Thin axum handlers over the core orchestrator and progress service. All
//! concrete infrastructure is wired in [`bootstrap`].
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Silence unused dev-dependency warnings in unit test builds
#[cfg(test)]
use http_body_util as _;
#[cfg(test)]
use serde_json as _;
#[cfg(test)]
use tokio_test as _;
#[cfg(test)]
use tower as _;

pub mod bootstrap;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

// Re-export primary types
pub use bootstrap::{AxumContext, CorsConfig, ProviderStatus, ServerConfig, bootstrap, start_server};
pub use error::HttpError;
pub use routes::{MAX_BODY_BYTES, create_router};
pub use state::AppState;
