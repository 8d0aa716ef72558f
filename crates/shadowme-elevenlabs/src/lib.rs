//! ElevenLabs adapter for the ShadowME voice provider port.
//!
//! [`ElevenLabsClient`] talks to the ElevenLabs REST API (voice creation,
//! text-to-speech, deletion, inventory) and implements
//! [`shadowme_core::ports::VoiceProviderPort`]. HTTP and JSON failures are
//! mapped to [`shadowme_core::ProviderError`] at the port boundary.
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

mod client;
mod config;
mod error;
mod models;
mod port;

// ============================================================================
// Public API
// ============================================================================

pub use client::ElevenLabsClient;
pub use config::{DEFAULT_BASE_URL, ElevenLabsConfig};
pub use error::{ElevenLabsError, ElevenLabsResult};

// Silence unused dev-dependency warnings
#[cfg(test)]
use tokio_test as _;
