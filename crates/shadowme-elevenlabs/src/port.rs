//! Port trait implementation for `ElevenLabsClient`.
//!
//! Implements the core-owned `VoiceProviderPort`, converting between the
//! ElevenLabs wire operations and core types.

use async_trait::async_trait;
use shadowme_core::ports::{
    CloneRequest, ProviderError, ProviderResult, ProviderVoice, SynthesizedAudio, VoiceProfile,
    VoiceProviderPort,
};

use crate::client::ElevenLabsClient;
use crate::error::ElevenLabsError;

// ============================================================================
// Error Mapping
// ============================================================================

/// Convert internal `ElevenLabsError` to core `ProviderError`.
fn map_error(err: ElevenLabsError) -> ProviderError {
    match err {
        ElevenLabsError::VoiceLimitReached { body } => ProviderError::ResourceLimit { message: body },
        ElevenLabsError::ApiRequestFailed { status, body } => match status {
            429 | 500..=599 => ProviderError::Unavailable {
                message: format!("HTTP {status}: {body}"),
            },
            _ => ProviderError::Rejected {
                status,
                message: body,
            },
        },
        ElevenLabsError::Timeout { after_ms } => ProviderError::Timeout {
            elapsed_ms: after_ms,
        },
        ElevenLabsError::Network(e) => ProviderError::Unavailable {
            message: e.to_string(),
        },
        ElevenLabsError::InvalidResponse { message } => ProviderError::InvalidResponse { message },
        ElevenLabsError::JsonParse(e) => ProviderError::InvalidResponse {
            message: e.to_string(),
        },
        ElevenLabsError::MissingApiKey => ProviderError::Configuration {
            message: "ELEVENLABS_API_KEY is not set".to_string(),
        },
        ElevenLabsError::InvalidUrl(e) => ProviderError::Configuration {
            message: e.to_string(),
        },
    }
}

// ============================================================================
// Port Implementation
// ============================================================================

#[async_trait]
impl VoiceProviderPort for ElevenLabsClient {
    async fn create_voice(&self, request: &CloneRequest) -> ProviderResult<String> {
        let sample = &request.sample;
        self.add_voice(
            &request.name,
            &request.description,
            &sample.file_name(),
            sample.format.mime_type(),
            sample.bytes.clone(),
        )
        .await
        .map_err(map_error)
    }

    async fn synthesize(
        &self,
        voice_id: &str,
        text: &str,
        profile: &VoiceProfile,
    ) -> ProviderResult<SynthesizedAudio> {
        let (bytes, content_type) = self
            .text_to_speech(voice_id, text, &profile.model_id, &profile.settings)
            .await
            .map_err(map_error)?;
        Ok(SynthesizedAudio {
            bytes,
            content_type,
        })
    }

    async fn delete_voice(&self, voice_id: &str) -> ProviderResult<()> {
        self.remove_voice(voice_id).await.map_err(map_error)
    }

    async fn list_voices(&self) -> ProviderResult<Vec<ProviderVoice>> {
        self.fetch_voices().await.map_err(map_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ElevenLabsConfig;
    use mockito::Matcher;
    use shadowme_core::{AudioSample, SynthesisConfig};

    fn client_for(server: &mockito::ServerGuard) -> ElevenLabsClient {
        ElevenLabsClient::new(
            &ElevenLabsConfig::new()
                .with_base_url(server.url())
                .with_api_key("test-key"),
        )
        .unwrap()
    }

    fn clone_request() -> CloneRequest {
        CloneRequest {
            name: "user_voice_1700000000000".to_string(),
            description: "User voice for pronunciation learning".to_string(),
            sample: AudioSample::from_data_url("data:audio/webm;base64,UklGRmRhdGE=").unwrap(),
        }
    }

    #[test]
    fn test_status_mapping() {
        let rejected = map_error(ElevenLabsError::ApiRequestFailed {
            status: 401,
            body: "bad key".to_string(),
        });
        assert!(matches!(rejected, ProviderError::Rejected { status: 401, .. }));

        let throttled = map_error(ElevenLabsError::ApiRequestFailed {
            status: 429,
            body: String::new(),
        });
        assert!(throttled.is_transient());

        let outage = map_error(ElevenLabsError::ApiRequestFailed {
            status: 503,
            body: String::new(),
        });
        assert!(outage.is_transient());

        assert!(map_error(ElevenLabsError::VoiceLimitReached { body: String::new() }).is_resource_limit());
        assert!(matches!(
            map_error(ElevenLabsError::MissingApiKey),
            ProviderError::Configuration { .. }
        ));
    }

    #[tokio::test]
    async fn test_create_voice_posts_multipart() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/voices/add")
            .match_header("xi-api-key", "test-key")
            .match_header("content-type", Matcher::Regex("multipart/form-data".to_string()))
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("user_voice_1700000000000".to_string()),
                Matcher::Regex("recording.webm".to_string()),
                Matcher::Regex("audio/webm".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"voice_id":"voice-123","requires_verification":false}"#)
            .create_async()
            .await;

        let voice_id = client_for(&server).create_voice(&clone_request()).await.unwrap();

        assert_eq!(voice_id, "voice-123");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_voice_limit_is_resource_limit() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/voices/add")
            .with_status(400)
            .with_body(r#"{"detail":{"status":"voice_limit_reached","message":"too many"}}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .create_voice(&clone_request())
            .await
            .unwrap_err();
        assert!(err.is_resource_limit());
    }

    #[tokio::test]
    async fn test_synthesize_sends_profile() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/text-to-speech/voice-123")
            .match_header("xi-api-key", "test-key")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "text": "Hello",
                "model_id": "eleven_multilingual_v2",
                "voice_settings": { "style": 0.5, "use_speaker_boost": true }
            })))
            .with_status(200)
            .with_header("content-type", "audio/mpeg")
            .with_body(b"ID3audio")
            .create_async()
            .await;

        let profile = SynthesisConfig::with_defaults().cloned_voice_profile;
        let audio = client_for(&server)
            .synthesize("voice-123", "Hello", &profile)
            .await
            .unwrap();

        assert_eq!(audio.bytes, b"ID3audio");
        assert_eq!(audio.content_type, "audio/mpeg");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_synthesize_server_error_is_unavailable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/text-to-speech/voice-123")
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let profile = SynthesisConfig::with_defaults().default_voice_profile;
        let err = client_for(&server)
            .synthesize("voice-123", "Hello", &profile)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn test_delete_and_list() {
        let mut server = mockito::Server::new_async().await;
        let delete = server
            .mock("DELETE", "/voices/voice-1")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;
        server
            .mock("GET", "/voices")
            .with_status(200)
            .with_body(
                r#"{"voices":[
                    {"voice_id":"voice-1","name":"user_voice_1","category":"cloned"},
                    {"voice_id":"21m00Tcm4TlvDq8ikWAM","name":"Rachel","category":"premade"}
                ]}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server);
        client.delete_voice("voice-1").await.unwrap();
        let voices = client.list_voices().await.unwrap();

        delete.assert_async().await;
        assert_eq!(voices.len(), 2);
        assert_eq!(voices[0].category.as_deref(), Some("cloned"));
    }

    #[tokio::test]
    async fn test_missing_key_never_reaches_network() {
        let server = mockito::Server::new_async().await;
        let client = ElevenLabsClient::new(&ElevenLabsConfig::new().with_base_url(server.url())).unwrap();

        let err = client.list_voices().await.unwrap_err();
        assert!(matches!(err, ProviderError::Configuration { .. }));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/voices")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = client_for(&server).list_voices().await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse { .. }));
    }
}
