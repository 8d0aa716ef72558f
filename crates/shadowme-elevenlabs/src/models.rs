//! ElevenLabs wire types.

use serde::{Deserialize, Serialize};
use shadowme_core::VoiceSettings;

/// Response of `POST /voices/add`.
#[derive(Debug, Deserialize)]
pub(crate) struct AddVoiceResponse {
    pub voice_id: String,
}

/// Body of `POST /text-to-speech/{voice_id}`.
#[derive(Debug, Serialize)]
pub(crate) struct TextToSpeechRequest<'a> {
    pub text: &'a str,
    pub model_id: &'a str,
    pub voice_settings: &'a VoiceSettings,
}

/// Response of `GET /voices`.
#[derive(Debug, Deserialize)]
pub(crate) struct VoicesResponse {
    #[serde(default)]
    pub voices: Vec<VoiceEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VoiceEntry {
    pub voice_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
}
