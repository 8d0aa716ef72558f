//! Status handler - configuration diagnostics.

use axum::Json;
use axum::extract::State;

use crate::dto::StatusResponse;
use crate::state::AppState;

/// `GET /api/status`
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let config = state.synthesis.config();
    Json(StatusResponse {
        api_key_exists: state.provider_status.api_key_configured,
        api_key_prefix: state
            .provider_status
            .masked_api_key
            .clone()
            .unwrap_or_else(|| "Not found".to_string()),
        cached_sessions: state.synthesis.cache().len().await,
        cache_ttl_secs: config.cache_ttl.as_secs(),
        default_voice_id: config.default_voice_id.clone(),
        timestamp: state.clock.now(),
    })
}
