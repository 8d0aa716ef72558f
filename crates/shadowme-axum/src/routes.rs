//! Route definitions and router construction.
//!
//! Handlers delegate to the orchestrator and the progress service held in
//! [`AxumContext`].

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::bootstrap::{AxumContext, CorsConfig};
use crate::handlers;
use crate::state::AppState;

/// Largest accepted request body. Recorded audio travels inline as base64.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Build CORS layer from configuration.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    match config {
        CorsConfig::AllowAll => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsConfig::AllowOrigins(origins) => {
            use axum::http::HeaderValue;
            let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// Build all API routes without the `/api` prefix.
///
/// The caller applies `.with_state()` before nesting under `/api`.
pub(crate) fn api_routes() -> Router<AppState> {
    Router::new()
        // Speech
        .route("/clone-voice", post(handlers::speech::clone_voice))
        .route("/generate-speech", post(handlers::speech::generate_speech))
        // Sessions
        .route("/sessions", get(handlers::sessions::list))
        .route("/sessions/{id}", delete(handlers::sessions::end))
        // Diagnostics
        .route("/voices", get(handlers::voices::inventory))
        .route("/status", get(handlers::status::status))
        // Progress
        .route("/progress/{user_id}", post(handlers::progress::record))
        .route("/progress/{user_id}/daily", get(handlers::progress::daily))
        .route("/progress/{user_id}/weekly", get(handlers::progress::weekly))
}

/// Create the main Axum router with all API routes.
///
/// # Path Parameter Syntax
/// Axum 0.8 uses brace syntax for path parameters: `{id}`, `{user_id}`
pub fn create_router(ctx: AxumContext, cors_config: &CorsConfig) -> Router {
    let state: AppState = Arc::new(ctx);
    let cors = build_cors_layer(cors_config);

    Router::new().route("/health", get(health_check)).nest(
        "/api",
        api_routes()
            .with_state(state)
            .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
            .layer(cors),
    )
}

/// Health check endpoint.
pub(crate) async fn health_check() -> &'static str {
    "OK"
}
