//! Speech handlers - `/api/clone-voice` and `/api/generate-speech`.
//!
//! Both return raw audio. The route that produced it is reported in the
//! `X-Voice-Source` header, and in `X-Fallback-Reason` when the default
//! voice answered.

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::header::{ACCEPT_RANGES, CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::debug;

use shadowme_core::{Synthesis, SynthesisRequest, VoiceSource};

use crate::error::HttpError;
use crate::state::AppState;

/// Text spoken when a clone request carries none.
pub const DEFAULT_TEXT: &str = "Hello, how are you today?";

pub const VOICE_SOURCE_HEADER: &str = "x-voice-source";
pub const FALLBACK_REASON_HEADER: &str = "x-fallback-reason";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloneVoiceRequest {
    #[serde(default)]
    pub text: Option<String>,
    /// `data:<mime>;base64,<payload>` recording of the speaker.
    #[serde(default)]
    pub audio_data: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSpeechRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub use_cloned_voice: bool,
}

/// `POST /api/clone-voice`
pub async fn clone_voice(
    State(state): State<AppState>,
    Json(req): Json<CloneVoiceRequest>,
) -> Result<Response, HttpError> {
    let text = req
        .text
        .filter(|text| !text.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TEXT.to_string());

    debug!(
        target: "shadowme.synthesis",
        session_id = req.session_id.as_deref(),
        has_audio = req.audio_data.is_some(),
        "Clone-voice request"
    );

    let synthesis = state
        .synthesis
        .synthesize(SynthesisRequest {
            text,
            audio_data: req.audio_data,
            session_id: req.session_id,
        })
        .await?;

    let file_name = match synthesis.source {
        VoiceSource::CachedVoice => "cached_cloned_voice.mp3",
        VoiceSource::ClonedVoice => "cloned_voice.mp3",
        VoiceSource::DefaultVoice => "fallback_voice.mp3",
    };
    audio_response(synthesis, file_name)
}

/// `POST /api/generate-speech`
pub async fn generate_speech(
    State(state): State<AppState>,
    Json(req): Json<GenerateSpeechRequest>,
) -> Result<Response, HttpError> {
    let synthesis = state
        .synthesis
        .speak(req.session_id.as_deref(), &req.text, req.use_cloned_voice)
        .await?;
    audio_response(synthesis, "speech.mp3")
}

fn audio_response(synthesis: Synthesis, file_name: &str) -> Result<Response, HttpError> {
    let content_type = HeaderValue::from_str(&synthesis.audio.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("audio/mpeg"));
    let disposition = HeaderValue::from_str(&format!("inline; filename=\"{file_name}\""))
        .map_err(|e| HttpError::Internal(format!("Invalid Content-Disposition: {e}")))?;

    let mut response = Body::from(synthesis.audio.bytes).into_response();
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, content_type);
    headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    headers.insert(CONTENT_DISPOSITION, disposition);
    headers.insert(
        VOICE_SOURCE_HEADER,
        HeaderValue::from_static(synthesis.source.as_str()),
    );
    if let Some(reason) = synthesis.fallback {
        headers.insert(FALLBACK_REASON_HEADER, HeaderValue::from_static(reason.as_str()));
    }
    Ok(response)
}
