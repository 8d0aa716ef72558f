//! ElevenLabs REST client.
//!
//! Every request carries the `xi-api-key` header. Non-success responses are
//! classified here; a body mentioning `voice_limit_reached` becomes
//! [`ElevenLabsError::VoiceLimitReached`].

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use shadowme_core::{ProviderVoice, VoiceSettings};
use tracing::debug;
use url::Url;

use crate::config::ElevenLabsConfig;
use crate::error::{ElevenLabsError, ElevenLabsResult};
use crate::models::{AddVoiceResponse, TextToSpeechRequest, VoicesResponse};

const API_KEY_HEADER: &str = "xi-api-key";
const VOICE_LIMIT_MARKER: &str = "voice_limit_reached";
const DEFAULT_AUDIO_TYPE: &str = "audio/mpeg";
const MAX_ERROR_BODY: usize = 512;

/// Client for the ElevenLabs REST API.
///
/// Use through [`shadowme_core::ports::VoiceProviderPort`]; the inherent
/// methods expose the wire-level operations for diagnostics.
#[derive(Clone)]
pub struct ElevenLabsClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
    timeout: Duration,
}

impl ElevenLabsClient {
    /// Create a client with the given configuration.
    pub fn new(config: &ElevenLabsConfig) -> ElevenLabsResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        // Joining relative paths needs a trailing slash on the root.
        let mut base = config.base_url.trim_end_matches('/').to_string();
        base.push('/');

        Ok(Self {
            http,
            base_url: Url::parse(&base)?,
            api_key: config.api_key.clone(),
            timeout: config.timeout,
        })
    }

    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// `POST /voices/add`: create a cloned voice from one recording.
    pub async fn add_voice(
        &self,
        name: &str,
        description: &str,
        file_name: &str,
        mime_type: &str,
        audio: Vec<u8>,
    ) -> ElevenLabsResult<String> {
        let part = Part::bytes(audio)
            .file_name(file_name.to_string())
            .mime_str(mime_type)?;
        let form = Form::new()
            .text("name", name.to_string())
            .text("description", description.to_string())
            .part("files", part);

        let url = self.endpoint("voices/add")?;
        debug!(target: "shadowme.provider", name, file_name, "Creating cloned voice");
        let response = self.send(self.authorized(self.http.post(url))?.multipart(form)).await?;

        let body: AddVoiceResponse = parse_json(response).await?;
        if body.voice_id.is_empty() {
            return Err(ElevenLabsError::InvalidResponse {
                message: "voice creation returned an empty voice_id".to_string(),
            });
        }
        Ok(body.voice_id)
    }

    /// `POST /text-to-speech/{voice_id}`: returns audio bytes and their type.
    pub async fn text_to_speech(
        &self,
        voice_id: &str,
        text: &str,
        model_id: &str,
        settings: &VoiceSettings,
    ) -> ElevenLabsResult<(Vec<u8>, String)> {
        let url = self.voice_endpoint("text-to-speech", voice_id)?;
        let body = TextToSpeechRequest {
            text,
            model_id,
            voice_settings: settings,
        };

        let response = self
            .send(
                self.authorized(self.http.post(url))?
                    .header(reqwest::header::ACCEPT, DEFAULT_AUDIO_TYPE)
                    .json(&body),
            )
            .await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .filter(|value| value.starts_with("audio/"))
            .unwrap_or(DEFAULT_AUDIO_TYPE)
            .to_string();
        let bytes = response.bytes().await.map_err(|e| self.transport(e))?;
        if bytes.is_empty() {
            return Err(ElevenLabsError::InvalidResponse {
                message: "text-to-speech returned no audio".to_string(),
            });
        }

        debug!(
            target: "shadowme.provider",
            voice_id,
            model_id,
            bytes = bytes.len(),
            "Synthesized speech"
        );
        Ok((bytes.to_vec(), content_type))
    }

    /// `DELETE /voices/{voice_id}`.
    pub async fn remove_voice(&self, voice_id: &str) -> ElevenLabsResult<()> {
        let url = self.voice_endpoint("voices", voice_id)?;
        self.send(self.authorized(self.http.delete(url))?).await?;
        debug!(target: "shadowme.provider", voice_id, "Deleted voice");
        Ok(())
    }

    /// `GET /voices`.
    pub async fn fetch_voices(&self) -> ElevenLabsResult<Vec<ProviderVoice>> {
        let url = self.endpoint("voices")?;
        let response = self.send(self.authorized(self.http.get(url))?).await?;
        let body: VoicesResponse = parse_json(response).await?;
        Ok(body
            .voices
            .into_iter()
            .map(|voice| ProviderVoice {
                voice_id: voice.voice_id,
                name: voice.name,
                category: voice.category,
            })
            .collect())
    }

    fn endpoint(&self, path: &str) -> ElevenLabsResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn voice_endpoint(&self, collection: &str, voice_id: &str) -> ElevenLabsResult<Url> {
        self.endpoint(&format!("{collection}/{}", urlencoding::encode(voice_id)))
    }

    fn authorized(&self, request: RequestBuilder) -> ElevenLabsResult<RequestBuilder> {
        let key = self.api_key.as_deref().ok_or(ElevenLabsError::MissingApiKey)?;
        Ok(request.header(API_KEY_HEADER, key))
    }

    async fn send(&self, request: RequestBuilder) -> ElevenLabsResult<Response> {
        let response = request.send().await.map_err(|e| self.transport(e))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if body.contains(VOICE_LIMIT_MARKER) {
            return Err(ElevenLabsError::VoiceLimitReached { body });
        }
        Err(ElevenLabsError::ApiRequestFailed {
            status: status.as_u16(),
            body: truncate(body),
        })
    }

    fn transport(&self, err: reqwest::Error) -> ElevenLabsError {
        if err.is_timeout() {
            ElevenLabsError::Timeout {
                after_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else {
            ElevenLabsError::Network(err)
        }
    }
}

async fn parse_json<T: serde::de::DeserializeOwned>(response: Response) -> ElevenLabsResult<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn truncate(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    body
}
