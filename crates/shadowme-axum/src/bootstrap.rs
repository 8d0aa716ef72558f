//! Axum server bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the web adapter. All concrete implementations are instantiated here.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use shadowme_core::{
    CacheSweeper, Clock, ProgressRepository, ProgressService, SynthesisConfig,
    SynthesisOrchestrator, SystemClock, VoiceCloneCache, VoiceProviderPort, validate_config,
};
use shadowme_db::{SqliteProgressRepository, setup_database};
use shadowme_elevenlabs::{ElevenLabsClient, ElevenLabsConfig};

/// Default listen port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default database location, relative to the working directory.
pub const DEFAULT_DATABASE_PATH: &str = "data/shadowme.db";

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default)]
pub enum CorsConfig {
    /// Allow all origins (development mode).
    #[default]
    AllowAll,
    /// Allow specific origins (production mode).
    AllowOrigins(Vec<String>),
}

/// Server configuration for the Axum adapter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port for the HTTP server.
    pub port: u16,
    /// SQLite file holding practice progress.
    pub database_path: PathBuf,
    /// CORS configuration.
    pub cors: CorsConfig,
    pub synthesis: SynthesisConfig,
    pub provider: ElevenLabsConfig,
}

impl ServerConfig {
    /// Create config with default values.
    pub fn with_defaults() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            cors: CorsConfig::default(),
            synthesis: SynthesisConfig::with_defaults(),
            provider: ElevenLabsConfig::new(),
        }
    }

    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = path.into();
        self
    }

    /// Set CORS to allow specific origins. An empty list keeps `AllowAll`.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        if !origins.is_empty() {
            self.cors = CorsConfig::AllowOrigins(origins);
        }
        self
    }

    #[must_use]
    pub fn with_synthesis(mut self, synthesis: SynthesisConfig) -> Self {
        self.synthesis = synthesis;
        self
    }

    #[must_use]
    pub fn with_provider(mut self, provider: ElevenLabsConfig) -> Self {
        self.provider = provider;
        self
    }
}

/// Credential diagnostics reported by `/api/status`.
///
/// Only a masked prefix of the key is ever kept here.
#[derive(Debug, Clone, Default)]
pub struct ProviderStatus {
    pub api_key_configured: bool,
    pub masked_api_key: Option<String>,
}

impl ProviderStatus {
    pub fn from_config(config: &ElevenLabsConfig) -> Self {
        Self {
            api_key_configured: config.has_api_key(),
            masked_api_key: config.masked_api_key(),
        }
    }
}

/// Application context for the Axum adapter.
///
/// Holds every initialized service the handlers need.
pub struct AxumContext {
    pub synthesis: Arc<SynthesisOrchestrator>,
    pub progress: Arc<ProgressService>,
    /// Source of "today" for progress routes and status timestamps.
    pub clock: Arc<dyn Clock>,
    pub provider_status: ProviderStatus,
}

/// Build the voice provider and orchestrator from configuration.
///
/// Shared with the CLI's one-shot voice commands, which need no database.
pub fn build_orchestrator(
    synthesis: &SynthesisConfig,
    provider: &ElevenLabsConfig,
) -> Result<Arc<SynthesisOrchestrator>> {
    validate_config(synthesis)?;

    if !provider.has_api_key() {
        warn!(
            target: "shadowme.provider",
            "ELEVENLABS_API_KEY is not set; every provider call will fail and requests get the terminal error"
        );
    }

    let client: Arc<dyn VoiceProviderPort> = Arc::new(ElevenLabsClient::new(provider)?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let cache = Arc::new(VoiceCloneCache::new(synthesis.cache_ttl));

    Ok(Arc::new(SynthesisOrchestrator::new(
        client,
        cache,
        clock,
        synthesis.clone(),
    )))
}

/// Bootstrap the Axum server with all services.
pub async fn bootstrap(config: &ServerConfig) -> Result<AxumContext> {
    info!(
        target: "shadowme.paths",
        database_path = %config.database_path.display(),
        provider_base_url = %config.provider.base_url(),
        "Axum bootstrap resolved configuration"
    );

    // 1. Progress storage
    let pool = setup_database(&config.database_path).await?;
    let repo: Arc<dyn ProgressRepository> = Arc::new(SqliteProgressRepository::new(pool));
    let progress = Arc::new(ProgressService::new(repo));

    // 2. Provider, cache and orchestrator
    let synthesis = build_orchestrator(&config.synthesis, &config.provider)?;

    Ok(AxumContext {
        synthesis,
        progress,
        clock: Arc::new(SystemClock),
        provider_status: ProviderStatus::from_config(&config.provider),
    })
}

/// Start the web server and run until `cancel` fires.
///
/// The cache sweeper runs alongside the server. On shutdown the sweeper is
/// joined and pending voice deletions are awaited before returning.
pub async fn start_server(config: ServerConfig, cancel: CancellationToken) -> Result<()> {
    use tokio::net::TcpListener;

    let ctx = bootstrap(&config).await?;
    let orchestrator = Arc::clone(&ctx.synthesis);

    let sweeper = CacheSweeper::new(Arc::clone(&orchestrator), config.synthesis.sweep_interval)
        .with_cancel_token(cancel.child_token())
        .start();

    let app = crate::routes::create_router(ctx, &config.cors);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("ShadowME server listening on http://{}", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(cancel.clone().cancelled_owned())
        .await;

    // Stop the sweeper even when serving failed.
    cancel.cancel();
    sweeper.shutdown().await;
    orchestrator.settle_cleanup().await;
    info!("ShadowME server shut down");

    served?;
    Ok(())
}
