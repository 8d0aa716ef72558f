//! Voice provider port.
//!
//! The three operations the orchestrator drives (clone, synthesize, delete)
//! plus the inventory listing used by the resource-limit cleanup pass. The
//! implementation lives in `shadowme-elevenlabs`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::AudioSample;

/// Errors from voice provider operations.
///
/// Transport and API specifics are mapped to these by the adapter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// Network failure, 5xx or rate limiting.
    #[error("Voice provider unavailable: {message}")]
    Unavailable { message: String },

    /// The call exceeded its time bound.
    #[error("Voice provider call timed out after {elapsed_ms} ms")]
    Timeout { elapsed_ms: u64 },

    /// The account has no room for another cloned voice.
    #[error("Voice provider resource limit reached: {message}")]
    ResourceLimit { message: String },

    /// The request was refused (bad credential, unknown voice, bad input).
    #[error("Voice provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The response could not be interpreted.
    #[error("Invalid provider response: {message}")]
    InvalidResponse { message: String },

    #[error("Provider configuration error: {message}")]
    Configuration { message: String },
}

impl ProviderError {
    pub const fn is_resource_limit(&self) -> bool {
        matches!(self, Self::ResourceLimit { .. })
    }

    /// Network-level failures; the same request may succeed later.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Timeout { .. })
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Voice quality knobs sent with every synthesis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_speaker_boost: Option<bool>,
}

/// Synthesis model plus settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceProfile {
    pub model_id: String,
    pub settings: VoiceSettings,
}

/// Everything needed to create a cloned voice.
#[derive(Debug, Clone)]
pub struct CloneRequest {
    pub name: String,
    pub description: String,
    pub sample: AudioSample,
}

/// Synthesized audio as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedAudio {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// One entry of the provider's voice inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderVoice {
    pub voice_id: String,
    pub name: String,
    pub category: Option<String>,
}

/// Port trait for the text-to-speech / voice-cloning provider.
#[async_trait]
pub trait VoiceProviderPort: Send + Sync {
    /// Create a cloned voice from an audio sample; returns its voice id.
    async fn create_voice(&self, request: &CloneRequest) -> ProviderResult<String>;

    /// Synthesize `text` with the given voice.
    async fn synthesize(
        &self,
        voice_id: &str,
        text: &str,
        profile: &VoiceProfile,
    ) -> ProviderResult<SynthesizedAudio>;

    async fn delete_voice(&self, voice_id: &str) -> ProviderResult<()>;

    async fn list_voices(&self) -> ProviderResult<Vec<ProviderVoice>>;
}
