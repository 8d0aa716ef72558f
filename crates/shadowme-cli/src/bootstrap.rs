//! CLI bootstrap - logging and service composition.
//!
//! The HTTP server is composed by `shadowme_axum::bootstrap`; the one-shot
//! voice commands only need the orchestrator built here.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use shadowme_axum::ServerConfig;
use shadowme_axum::bootstrap::build_orchestrator;
use shadowme_core::{SynthesisConfig, SynthesisOrchestrator};
use shadowme_elevenlabs::ElevenLabsConfig;

use crate::commands::ServeArgs;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` with `--verbose`.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Orchestrator for commands that talk to the provider directly.
pub fn voice_orchestrator(provider: &ElevenLabsConfig) -> Result<Arc<SynthesisOrchestrator>> {
    build_orchestrator(&SynthesisConfig::with_defaults(), provider)
}

/// Full server configuration from `serve` arguments.
pub fn server_config(args: &ServeArgs, provider: ElevenLabsConfig) -> ServerConfig {
    ServerConfig::with_defaults()
        .with_port(args.port)
        .with_database_path(args.database.clone())
        .with_allowed_origins(args.allowed_origins.clone())
        .with_synthesis(args.synthesis.to_config())
        .with_provider(provider)
}
