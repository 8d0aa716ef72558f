//! Voice inventory handler - what the provider account currently holds.

use axum::Json;
use axum::extract::State;
use tracing::warn;

use shadowme_core::ProviderError;

use crate::dto::{UserVoiceDto, VoiceInventoryResponse};
use crate::state::AppState;

/// Provider category of voices created through instant cloning.
const CLONED_CATEGORY: &str = "cloned";

/// `GET /api/voices`
///
/// Always answers 200; a provider failure is reported in the body.
pub async fn inventory(State(state): State<AppState>) -> Json<VoiceInventoryResponse> {
    let prefix = &state.synthesis.config().clone_name_prefix;

    match state.synthesis.provider().list_voices().await {
        Ok(voices) => {
            let total_voices = voices.len();
            let user_voice_list: Vec<UserVoiceDto> = voices
                .into_iter()
                .filter(|voice| {
                    voice.name.starts_with(prefix.as_str())
                        && voice.category.as_deref() == Some(CLONED_CATEGORY)
                })
                .map(UserVoiceDto::from)
                .collect();

            Json(VoiceInventoryResponse {
                success: true,
                total_voices,
                user_voices: user_voice_list.len(),
                user_voice_list,
                api_key_status: "valid",
                error: None,
            })
        }
        Err(err) => {
            warn!(target: "shadowme.provider", error = %err, "Voice inventory failed");
            Json(VoiceInventoryResponse {
                success: false,
                total_voices: 0,
                user_voices: 0,
                user_voice_list: Vec::new(),
                api_key_status: api_key_status(&err),
                error: Some(err.to_string()),
            })
        }
    }
}

const fn api_key_status(err: &ProviderError) -> &'static str {
    match err {
        ProviderError::Rejected {
            status: 401 | 403, ..
        } => "invalid",
        ProviderError::Configuration { .. } => "missing",
        _ => "unknown",
    }
}
