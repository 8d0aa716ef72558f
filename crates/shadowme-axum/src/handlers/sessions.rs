//! Session handlers - cached voice diagnostics and explicit logout.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::dto::SessionsResponse;
use crate::error::HttpError;
use crate::state::AppState;

/// `GET /api/sessions`
pub async fn list(State(state): State<AppState>) -> Json<SessionsResponse> {
    let sessions = state.synthesis.cached_sessions().await;
    Json(SessionsResponse {
        count: sessions.len(),
        sessions,
    })
}

/// `DELETE /api/sessions/{id}`
///
/// Drops the session's cached voice and schedules its remote deletion.
pub async fn end(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, HttpError> {
    if state.synthesis.end_session(&session_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(HttpError::NotFound(format!(
            "No cached voice for session {session_id}"
        )))
    }
}
