//! Voice synthesis orchestrator.
//!
//! Produces audio for a practice sentence by walking a fixed fallback chain:
//! a live cached clone for the session, then a freshly cloned voice, then the
//! provider's default voice. Only a failure of the default voice reaches the
//! caller.
//!
//! Remote deletions (expired, replaced or unusable clones) are spawned onto a
//! task tracker and never block or fail a request. [`settle_cleanup`] awaits
//! them.
//!
//! [`settle_cleanup`]: SynthesisOrchestrator::settle_cleanup

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use super::voice_cache::VoiceCloneCache;
use crate::config::SynthesisConfig;
use crate::domain::{AudioSample, VoiceCloneEntry};
use crate::ports::{
    Clock, CloneRequest, ProviderError, ProviderResult, SynthesizedAudio, VoiceProfile,
    VoiceProviderPort,
};

/// Message surfaced when the default voice fails as well.
pub const TERMINAL_FAILURE_MESSAGE: &str = "All voice generation methods failed";

/// Errors returned by the orchestrator.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// Every route failed, including the default voice.
    #[error("{message}")]
    Terminal {
        message: String,
        #[source]
        source: ProviderError,
    },
}

/// Which route produced the audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceSource {
    CachedVoice,
    ClonedVoice,
    DefaultVoice,
}

impl VoiceSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CachedVoice => "cached",
            Self::ClonedVoice => "cloned",
            Self::DefaultVoice => "default",
        }
    }
}

/// Why a request ended on the default voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    NoAudio,
    InsufficientAudio,
    UndecodableAudio,
    CloneFailed,
    SoftDeadline,
    ClonedSynthesisFailed,
    CachedSynthesisFailed,
    NoCachedVoice,
    ClonedVoiceNotRequested,
}

impl FallbackReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoAudio => "no_audio",
            Self::InsufficientAudio => "insufficient_audio",
            Self::UndecodableAudio => "undecodable_audio",
            Self::CloneFailed => "clone_failed",
            Self::SoftDeadline => "soft_deadline",
            Self::ClonedSynthesisFailed => "cloned_synthesis_failed",
            Self::CachedSynthesisFailed => "cached_synthesis_failed",
            Self::NoCachedVoice => "no_cached_voice",
            Self::ClonedVoiceNotRequested => "cloned_voice_not_requested",
        }
    }
}

/// Input of [`SynthesisOrchestrator::synthesize`].
#[derive(Debug, Clone, Default)]
pub struct SynthesisRequest {
    pub text: String,
    /// Recorded audio as a `data:<mime>;base64,...` URL.
    pub audio_data: Option<String>,
    pub session_id: Option<String>,
}

/// Successful synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesis {
    pub audio: SynthesizedAudio,
    pub source: VoiceSource,
    pub voice_id: String,
    /// Set when `source` is the default voice.
    pub fallback: Option<FallbackReason>,
}

/// Outcome of a resource-limit cleanup pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    /// Cloned voices created by this service that were found.
    pub examined: usize,
    pub deleted: Vec<String>,
    pub failed: Vec<String>,
}

/// Outcome of one expiry sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub evicted: usize,
    pub deleted: usize,
    pub failed: usize,
}

/// Decides between cached, cloned and default voices for each request.
pub struct SynthesisOrchestrator {
    provider: Arc<dyn VoiceProviderPort>,
    cache: Arc<VoiceCloneCache>,
    clock: Arc<dyn Clock>,
    config: SynthesisConfig,
    cleanup: TaskTracker,
}

impl SynthesisOrchestrator {
    pub fn new(
        provider: Arc<dyn VoiceProviderPort>,
        cache: Arc<VoiceCloneCache>,
        clock: Arc<dyn Clock>,
        config: SynthesisConfig,
    ) -> Self {
        Self {
            provider,
            cache,
            clock,
            config,
            cleanup: TaskTracker::new(),
        }
    }

    pub const fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    pub const fn cache(&self) -> &Arc<VoiceCloneCache> {
        &self.cache
    }

    pub fn provider(&self) -> Arc<dyn VoiceProviderPort> {
        Arc::clone(&self.provider)
    }

    /// Synthesize `text`, cloning the speaker's voice when possible.
    pub async fn synthesize(&self, request: SynthesisRequest) -> Result<Synthesis, SynthesisError> {
        let started = Instant::now();
        let text = validate_text(&request.text)?;
        let session_id = session_key(request.session_id.as_deref());

        let audio = match request.audio_data.as_deref() {
            None => return self.default_voice(text, FallbackReason::NoAudio).await,
            Some(data) if data.len() < self.config.min_audio_chars => {
                debug!(
                    target: "shadowme.synthesis",
                    audio_chars = data.len(),
                    min_audio_chars = self.config.min_audio_chars,
                    "Audio too short to clone"
                );
                return self
                    .default_voice(text, FallbackReason::InsufficientAudio)
                    .await;
            }
            Some(data) => data,
        };

        if let Some(session_id) = session_id {
            if let Ok(synthesis) = self.try_cached(session_id, text, false).await {
                return Ok(synthesis);
            }
        }

        let reason = match self.clone_and_speak(session_id, text, audio, started).await {
            Ok(synthesis) => {
                info!(
                    target: "shadowme.synthesis",
                    session_id,
                    voice_id = %synthesis.voice_id,
                    elapsed_ms = elapsed_ms(started),
                    "Synthesized with freshly cloned voice"
                );
                return Ok(synthesis);
            }
            Err(reason) => reason,
        };
        self.default_voice(text, reason).await
    }

    /// Synthesize with an already cached voice, or the default voice.
    ///
    /// Never clones. A cached voice that fails is evicted and deleted.
    pub async fn speak(
        &self,
        session_id: Option<&str>,
        text: &str,
        use_cloned_voice: bool,
    ) -> Result<Synthesis, SynthesisError> {
        let text = validate_text(text)?;
        let reason = match session_key(session_id) {
            Some(session_id) if use_cloned_voice => {
                match self.try_cached(session_id, text, true).await {
                    Ok(synthesis) => return Ok(synthesis),
                    Err(reason) => reason,
                }
            }
            _ => FallbackReason::ClonedVoiceNotRequested,
        };
        self.default_voice(text, reason).await
    }

    /// Forget the session's voice and delete it remotely.
    ///
    /// Returns whether the session had an entry.
    pub async fn end_session(&self, session_id: &str) -> bool {
        let Some(entry) = self.cache.remove(session_id).await else {
            return false;
        };
        info!(
            target: "shadowme.cache",
            session_id,
            voice_id = %entry.voice_id,
            "Session ended"
        );
        self.schedule_deletion(entry.voice_id, "session_ended");
        true
    }

    /// Evict every expired entry and delete its voice.
    ///
    /// Entries leave the cache before any remote call is made.
    pub async fn sweep_expired(&self) -> SweepReport {
        let expired = self.cache.sweep_expired(self.clock.now()).await;
        let mut report = SweepReport {
            evicted: expired.len(),
            ..SweepReport::default()
        };

        for entry in expired {
            match delete_bounded(self.provider.as_ref(), &entry.voice_id, self.config.provider_timeout)
                .await
            {
                Ok(()) => report.deleted += 1,
                Err(e) => {
                    report.failed += 1;
                    warn!(
                        target: "shadowme.cache",
                        session_id = %entry.session_id,
                        voice_id = %entry.voice_id,
                        error = %e,
                        "Failed to delete expired voice"
                    );
                }
            }
        }

        if report.evicted > 0 {
            info!(
                target: "shadowme.cache",
                evicted = report.evicted,
                deleted = report.deleted,
                failed = report.failed,
                "Swept expired voices"
            );
        }
        report
    }

    pub async fn cached_sessions(&self) -> Vec<VoiceCloneEntry> {
        self.cache.snapshot().await
    }

    /// Wait for every scheduled remote deletion to finish.
    pub async fn settle_cleanup(&self) {
        self.cleanup.close();
        self.cleanup.wait().await;
        self.cleanup.reopen();
    }

    /// Delete this service's older cloned voices, keeping the newest `keep`.
    ///
    /// Voices are recognized by the clone name prefix and the `cloned`
    /// category. They are ordered by the millisecond timestamp in their name,
    /// or left in listing order when any name lacks one.
    pub async fn cleanup_voices(&self, keep: usize) -> ProviderResult<CleanupReport> {
        let voices = self
            .bounded(self.provider.list_voices())
            .await?;

        let prefix = self.config.clone_name_prefix.as_str();
        let mut ours: Vec<_> = voices
            .into_iter()
            .filter(|voice| {
                voice.name.starts_with(prefix) && voice.category.as_deref() == Some("cloned")
            })
            .collect();

        let stamps: Option<Vec<u64>> = ours
            .iter()
            .map(|voice| voice.name.strip_prefix(prefix)?.parse().ok())
            .collect();
        if let Some(stamps) = stamps {
            let mut keyed: Vec<_> = stamps.into_iter().zip(ours).collect();
            keyed.sort_by_key(|(stamp, _)| *stamp);
            ours = keyed.into_iter().map(|(_, voice)| voice).collect();
        }

        let mut report = CleanupReport {
            examined: ours.len(),
            ..CleanupReport::default()
        };
        let surplus = ours.len().saturating_sub(keep);
        for voice in ours.into_iter().take(surplus) {
            match delete_bounded(self.provider.as_ref(), &voice.voice_id, self.config.provider_timeout)
                .await
            {
                Ok(()) => report.deleted.push(voice.voice_id),
                Err(e) => {
                    warn!(
                        target: "shadowme.provider",
                        voice_id = %voice.voice_id,
                        error = %e,
                        "Failed to delete surplus voice"
                    );
                    report.failed.push(voice.voice_id);
                }
            }
        }

        info!(
            target: "shadowme.provider",
            examined = report.examined,
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            keep,
            "Cleaned up cloned voices"
        );
        Ok(report)
    }

    /// Synthesize with the session's live cached voice.
    ///
    /// An expired entry is evicted and its voice deleted. A live entry whose
    /// synthesis fails is evicted; with `delete_on_failure` its voice is
    /// deleted too.
    async fn try_cached(
        &self,
        session_id: &str,
        text: &str,
        delete_on_failure: bool,
    ) -> Result<Synthesis, FallbackReason> {
        let now = self.clock.now();
        let Some(entry) = self.cache.get(session_id, now).await else {
            if let Some(expired) = self.cache.take_expired(session_id, now).await {
                info!(
                    target: "shadowme.cache",
                    session_id,
                    voice_id = %expired.voice_id,
                    "Cached voice expired"
                );
                self.schedule_deletion(expired.voice_id, "expired");
            }
            return Err(FallbackReason::NoCachedVoice);
        };

        match self
            .tts(&entry.voice_id, text, &self.config.cloned_voice_profile)
            .await
        {
            Ok(audio) => {
                self.cache
                    .touch(session_id, &entry.voice_id, self.clock.now())
                    .await;
                debug!(
                    target: "shadowme.synthesis",
                    session_id,
                    voice_id = %entry.voice_id,
                    "Synthesized with cached voice"
                );
                Ok(Synthesis {
                    audio,
                    source: VoiceSource::CachedVoice,
                    voice_id: entry.voice_id,
                    fallback: None,
                })
            }
            Err(e) => {
                warn!(
                    target: "shadowme.synthesis",
                    session_id,
                    voice_id = %entry.voice_id,
                    error = %e,
                    "Cached voice failed, evicting"
                );
                self.cache.remove_if_voice(session_id, &entry.voice_id).await;
                if delete_on_failure {
                    self.schedule_deletion(entry.voice_id, "cached_synthesis_failed");
                }
                Err(FallbackReason::CachedSynthesisFailed)
            }
        }
    }

    async fn clone_and_speak(
        &self,
        session_id: Option<&str>,
        text: &str,
        audio: &str,
        started: Instant,
    ) -> Result<Synthesis, FallbackReason> {
        if self.deadline_passed(started) {
            return Err(FallbackReason::SoftDeadline);
        }

        let sample = AudioSample::from_data_url(audio).map_err(|e| {
            warn!(target: "shadowme.synthesis", error = %e, "Could not decode recorded audio");
            FallbackReason::UndecodableAudio
        })?;

        let voice_id = self.create_voice_with_cleanup(&sample, started).await?;

        if let Some(session_id) = session_id {
            let replaced = self
                .cache
                .put(session_id, &voice_id, text, self.clock.now())
                .await;
            if let Some(old) = replaced.filter(|old| old.voice_id != voice_id) {
                self.schedule_deletion(old.voice_id, "replaced");
            }
        }

        if self.deadline_passed(started) {
            warn!(
                target: "shadowme.synthesis",
                voice_id = %voice_id,
                elapsed_ms = elapsed_ms(started),
                "Soft deadline passed after cloning"
            );
            if session_id.is_none() {
                self.schedule_deletion(voice_id, "uncached");
            }
            return Err(FallbackReason::SoftDeadline);
        }

        match self
            .tts(&voice_id, text, &self.config.cloned_voice_profile)
            .await
        {
            Ok(audio) => {
                // Without a session the clone can never be reused.
                if session_id.is_none() {
                    self.schedule_deletion(voice_id.clone(), "uncached");
                }
                Ok(Synthesis {
                    audio,
                    source: VoiceSource::ClonedVoice,
                    voice_id,
                    fallback: None,
                })
            }
            Err(e) => {
                warn!(
                    target: "shadowme.synthesis",
                    voice_id = %voice_id,
                    error = %e,
                    "Synthesis with cloned voice failed"
                );
                if let Some(session_id) = session_id {
                    self.cache.remove_if_voice(session_id, &voice_id).await;
                }
                self.schedule_deletion(voice_id, "unusable");
                Err(FallbackReason::ClonedSynthesisFailed)
            }
        }
    }

    /// Create a cloned voice, running one cleanup pass and one retry when
    /// the provider reports its voice limit.
    async fn create_voice_with_cleanup(
        &self,
        sample: &AudioSample,
        started: Instant,
    ) -> Result<String, FallbackReason> {
        let request = self.clone_request(sample);
        let first = self.bounded(self.provider.create_voice(&request)).await;

        let error = match first {
            Ok(voice_id) => return Ok(voice_id),
            Err(e) if e.is_resource_limit() => e,
            Err(e) => {
                warn!(target: "shadowme.synthesis", error = %e, "Voice cloning failed");
                return Err(FallbackReason::CloneFailed);
            }
        };

        info!(
            target: "shadowme.synthesis",
            error = %error,
            "Voice limit reached, cleaning up before retry"
        );
        if let Err(e) = self.cleanup_voices(self.config.keep_recent_voices).await {
            warn!(target: "shadowme.synthesis", error = %e, "Voice cleanup failed");
        }

        if self.deadline_passed(started) {
            return Err(FallbackReason::SoftDeadline);
        }

        let retry = self.clone_request(sample);
        self.bounded(self.provider.create_voice(&retry))
            .await
            .map_err(|e| {
                warn!(target: "shadowme.synthesis", error = %e, "Voice cloning retry failed");
                FallbackReason::CloneFailed
            })
    }

    async fn default_voice(
        &self,
        text: &str,
        reason: FallbackReason,
    ) -> Result<Synthesis, SynthesisError> {
        let voice_id = self.config.default_voice_id.as_str();
        info!(
            target: "shadowme.synthesis",
            reason = reason.as_str(),
            voice_id,
            "Using default voice"
        );

        match self
            .tts(voice_id, text, &self.config.default_voice_profile)
            .await
        {
            Ok(audio) => Ok(Synthesis {
                audio,
                source: VoiceSource::DefaultVoice,
                voice_id: voice_id.to_string(),
                fallback: Some(reason),
            }),
            Err(source) => {
                error!(
                    target: "shadowme.synthesis",
                    reason = reason.as_str(),
                    error = %source,
                    "Default voice failed"
                );
                Err(SynthesisError::Terminal {
                    message: TERMINAL_FAILURE_MESSAGE.to_string(),
                    source,
                })
            }
        }
    }

    async fn tts(
        &self,
        voice_id: &str,
        text: &str,
        profile: &VoiceProfile,
    ) -> ProviderResult<SynthesizedAudio> {
        self.bounded(self.provider.synthesize(voice_id, text, profile))
            .await
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = ProviderResult<T>> + Send,
    ) -> ProviderResult<T> {
        with_timeout(self.config.provider_timeout, call).await
    }

    fn clone_request(&self, sample: &AudioSample) -> CloneRequest {
        let millis = self.clock.now().timestamp_millis();
        CloneRequest {
            name: format!("{}{millis}", self.config.clone_name_prefix),
            description: self.config.clone_description.clone(),
            sample: sample.clone(),
        }
    }

    fn deadline_passed(&self, started: Instant) -> bool {
        started.elapsed() >= self.config.soft_deadline
    }

    fn schedule_deletion(&self, voice_id: String, reason: &'static str) {
        let provider = Arc::clone(&self.provider);
        let timeout = self.config.provider_timeout;
        self.cleanup.spawn(async move {
            match delete_bounded(provider.as_ref(), &voice_id, timeout).await {
                Ok(()) => debug!(
                    target: "shadowme.provider",
                    voice_id = %voice_id,
                    reason,
                    "Deleted voice"
                ),
                Err(e) => warn!(
                    target: "shadowme.provider",
                    voice_id = %voice_id,
                    reason,
                    error = %e,
                    "Voice deletion failed"
                ),
            }
        });
    }
}

async fn with_timeout<T>(
    limit: Duration,
    call: impl Future<Output = ProviderResult<T>> + Send,
) -> ProviderResult<T> {
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or_else(|_| {
            Err(ProviderError::Timeout {
                elapsed_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
            })
        })
}

async fn delete_bounded(
    provider: &dyn VoiceProviderPort,
    voice_id: &str,
    limit: Duration,
) -> ProviderResult<()> {
    with_timeout(limit, provider.delete_voice(voice_id)).await
}

fn validate_text(text: &str) -> Result<&str, SynthesisError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(SynthesisError::Validation("Text is required".to_string()));
    }
    Ok(text)
}

/// Session ids are opaque keys: only an empty id is treated as absent.
fn session_key(session_id: Option<&str>) -> Option<&str> {
    session_id.filter(|id| !id.is_empty())
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_VOICE_ID;
    use crate::testing::{FakeVoiceProvider, ManualClock, ProviderCall};
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    const MINUTE: Duration = Duration::from_secs(60);

    struct Harness {
        provider: Arc<FakeVoiceProvider>,
        clock: Arc<ManualClock>,
        orchestrator: SynthesisOrchestrator,
    }

    fn harness_with(config: SynthesisConfig) -> Harness {
        let provider = Arc::new(FakeVoiceProvider::new());
        let clock = Arc::new(ManualClock::at_epoch());
        let cache = Arc::new(VoiceCloneCache::new(config.cache_ttl));
        let orchestrator = SynthesisOrchestrator::new(
            provider.clone(),
            cache,
            clock.clone(),
            config,
        );
        Harness {
            provider,
            clock,
            orchestrator,
        }
    }

    fn harness() -> Harness {
        harness_with(SynthesisConfig::with_defaults())
    }

    fn recording() -> String {
        format!("data:audio/webm;base64,{}", STANDARD.encode([7u8; 256]))
    }

    fn request(session: Option<&str>, audio: Option<String>) -> SynthesisRequest {
        SynthesisRequest {
            text: "Nice to meet you".to_string(),
            audio_data: audio,
            session_id: session.map(str::to_string),
        }
    }

    fn limit_error() -> ProviderError {
        ProviderError::ResourceLimit {
            message: "voice_limit_reached".to_string(),
        }
    }

    #[tokio::test]
    async fn test_blank_text_is_rejected() {
        let h = harness();
        let err = h
            .orchestrator
            .synthesize(SynthesisRequest {
                text: "   ".to_string(),
                ..SynthesisRequest::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, SynthesisError::Validation(_)));
        assert!(h.provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_audio_uses_default_voice_only() {
        let h = harness();
        let result = h.orchestrator.synthesize(request(Some("s1"), None)).await.unwrap();

        assert_eq!(result.source, VoiceSource::DefaultVoice);
        assert_eq!(result.fallback, Some(FallbackReason::NoAudio));
        assert_eq!(h.provider.clone_attempts(), 0);
        assert_eq!(h.provider.synthesized_with(), vec![DEFAULT_VOICE_ID]);
    }

    #[tokio::test]
    async fn test_insufficient_audio_never_clones() {
        let h = harness();
        let short = "data:audio/webm;base64,AAAA".to_string();
        let result = h
            .orchestrator
            .synthesize(request(Some("s1"), Some(short)))
            .await
            .unwrap();

        assert_eq!(result.fallback, Some(FallbackReason::InsufficientAudio));
        assert_eq!(h.provider.clone_attempts(), 0);
        assert_eq!(h.provider.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_fresh_clone_is_cached_and_kept() {
        let h = harness();
        let result = h
            .orchestrator
            .synthesize(request(Some("s1"), Some(recording())))
            .await
            .unwrap();

        assert_eq!(result.source, VoiceSource::ClonedVoice);
        assert_eq!(result.voice_id, "cloned-1");
        assert_eq!(result.audio.bytes, b"audio:cloned-1:Nice to meet you");

        let cached = h.orchestrator.cached_sessions().await;
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].voice_id, "cloned-1");
        assert_eq!(cached[0].sample_text, "Nice to meet you");

        h.orchestrator.settle_cleanup().await;
        assert!(h.provider.deleted().is_empty());
    }

    #[tokio::test]
    async fn test_clone_request_carries_prefix_and_extension() {
        let h = harness();
        h.orchestrator
            .synthesize(request(Some("s1"), Some(recording())))
            .await
            .unwrap();

        let expected_name = format!("user_voice_{}", h.clock.now().timestamp_millis());
        assert_eq!(
            h.provider.calls()[0],
            ProviderCall::CreateVoice {
                name: expected_name,
                file_name: "recording.webm".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_cache_hit_skips_cloning() {
        let h = harness();
        h.orchestrator
            .cache()
            .put("s1", "v-cached", "hi", h.clock.now())
            .await;
        h.provider.fail_clones_with(ProviderError::Unavailable {
            message: "down".to_string(),
        });

        h.clock.advance(5 * MINUTE);
        let result = h
            .orchestrator
            .synthesize(request(Some("s1"), Some(recording())))
            .await
            .unwrap();

        assert_eq!(result.source, VoiceSource::CachedVoice);
        assert_eq!(result.voice_id, "v-cached");
        assert_eq!(h.provider.clone_attempts(), 0);

        let entry = h.orchestrator.cache().get("s1", h.clock.now()).await.unwrap();
        assert_eq!(entry.last_used_at, h.clock.now());
    }

    #[tokio::test]
    async fn test_second_request_reuses_clone() {
        let h = harness();
        h.orchestrator
            .synthesize(request(Some("s1"), Some(recording())))
            .await
            .unwrap();
        h.clock.advance(MINUTE);

        let second = h
            .orchestrator
            .synthesize(request(Some("s1"), Some(recording())))
            .await
            .unwrap();

        assert_eq!(second.source, VoiceSource::CachedVoice);
        assert_eq!(second.voice_id, "cloned-1");
        assert_eq!(h.provider.clone_attempts(), 1);
    }

    #[tokio::test]
    async fn test_slow_cache_hit_still_extends_life() {
        let h = harness();
        h.orchestrator
            .cache()
            .put("s1", "v-cached", "hi", h.clock.now())
            .await;
        h.clock.advance(29 * MINUTE);
        h.provider.set_synthesis_latency(h.clock.clone(), 2 * MINUTE);

        let result = h
            .orchestrator
            .synthesize(request(Some("s1"), Some(recording())))
            .await
            .unwrap();
        assert_eq!(result.source, VoiceSource::CachedVoice);

        let entry = h.orchestrator.cache().get("s1", h.clock.now()).await.unwrap();
        assert_eq!(entry.voice_id, "v-cached");
        assert_eq!(entry.last_used_at, h.clock.now());

        h.orchestrator.settle_cleanup().await;
        assert!(h.provider.deleted().is_empty());
        assert_eq!(h.provider.clone_attempts(), 0);
    }

    #[tokio::test]
    async fn test_session_ids_are_not_trimmed() {
        let h = harness();
        let padded = h
            .orchestrator
            .synthesize(request(Some(" s1"), Some(recording())))
            .await
            .unwrap();
        let plain = h
            .orchestrator
            .synthesize(request(Some("s1"), Some(recording())))
            .await
            .unwrap();

        assert_eq!(padded.source, VoiceSource::ClonedVoice);
        assert_eq!(plain.source, VoiceSource::ClonedVoice);
        assert_ne!(padded.voice_id, plain.voice_id);
        assert_eq!(h.orchestrator.cached_sessions().await.len(), 2);

        assert!(h.orchestrator.end_session(" s1").await);
        h.orchestrator.settle_cleanup().await;
        assert_eq!(h.provider.deleted(), vec![padded.voice_id]);

        let cached = h.orchestrator.cached_sessions().await;
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].session_id, "s1");
    }

    #[tokio::test]
    async fn test_empty_session_id_is_not_cached() {
        let h = harness();
        let result = h
            .orchestrator
            .synthesize(request(Some(""), Some(recording())))
            .await
            .unwrap();

        assert_eq!(result.source, VoiceSource::ClonedVoice);
        assert!(h.orchestrator.cached_sessions().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_cache_hit_evicts_and_reclones() {
        let h = harness();
        h.orchestrator
            .cache()
            .put("s1", "v-gone", "hi", h.clock.now())
            .await;
        h.provider.fail_synthesis_for("v-gone");

        let result = h
            .orchestrator
            .synthesize(request(Some("s1"), Some(recording())))
            .await
            .unwrap();

        assert_eq!(result.source, VoiceSource::ClonedVoice);
        assert_eq!(result.voice_id, "cloned-1");
        let cached = h.orchestrator.cache().get("s1", h.clock.now()).await.unwrap();
        assert_eq!(cached.voice_id, "cloned-1");

        h.orchestrator.settle_cleanup().await;
        assert!(h.provider.deleted().is_empty());
    }

    #[tokio::test]
    async fn test_expired_entry_is_deleted_before_recloning() {
        let h = harness();
        h.orchestrator
            .cache()
            .put("s1", "v-old", "hi", h.clock.now())
            .await;
        h.clock.advance(31 * MINUTE);

        let result = h
            .orchestrator
            .synthesize(request(Some("s1"), Some(recording())))
            .await
            .unwrap();
        h.orchestrator.settle_cleanup().await;

        assert_eq!(result.source, VoiceSource::ClonedVoice);
        assert_eq!(h.provider.deleted(), vec!["v-old"]);
        assert!(!h.provider.synthesized_with().contains(&"v-old".to_string()));
    }

    #[tokio::test]
    async fn test_fallback_chain_ends_on_default_voice_once() {
        let h = harness();
        h.provider.fail_clones_with(ProviderError::Unavailable {
            message: "down".to_string(),
        });
        h.provider.fail_synthesis_for("cloned-1");

        let result = h
            .orchestrator
            .synthesize(request(Some("s1"), Some(recording())))
            .await
            .unwrap();

        assert_eq!(result.source, VoiceSource::DefaultVoice);
        assert_eq!(result.fallback, Some(FallbackReason::CloneFailed));
        let defaults = h
            .provider
            .synthesized_with()
            .into_iter()
            .filter(|id| id == DEFAULT_VOICE_ID)
            .count();
        assert_eq!(defaults, 1);
    }

    #[tokio::test]
    async fn test_terminal_error_when_default_voice_fails() {
        let h = harness();
        h.provider.fail_clones_with(ProviderError::Unavailable {
            message: "down".to_string(),
        });
        h.provider.fail_all_synthesis();

        let err = h
            .orchestrator
            .synthesize(request(Some("s1"), Some(recording())))
            .await
            .unwrap_err();

        assert!(matches!(err, SynthesisError::Terminal { .. }));
        assert_eq!(err.to_string(), TERMINAL_FAILURE_MESSAGE);
        assert_eq!(h.provider.synthesized_with(), vec![DEFAULT_VOICE_ID]);
    }

    #[tokio::test]
    async fn test_unusable_clone_is_deleted_and_uncached() {
        let h = harness();
        h.provider.fail_synthesis_for("cloned-1");

        let result = h
            .orchestrator
            .synthesize(request(Some("s1"), Some(recording())))
            .await
            .unwrap();
        h.orchestrator.settle_cleanup().await;

        assert_eq!(result.fallback, Some(FallbackReason::ClonedSynthesisFailed));
        assert_eq!(h.provider.deleted(), vec!["cloned-1"]);
        assert!(h.orchestrator.cached_sessions().await.is_empty());
    }

    #[tokio::test]
    async fn test_resource_limit_cleans_up_once_and_retries() {
        let h = harness();
        h.provider.add_voice("old-1", "user_voice_1000", Some("cloned"));
        h.provider.add_voice("old-3", "user_voice_3000", Some("cloned"));
        h.provider.add_voice("old-2", "user_voice_2000", Some("cloned"));
        h.provider.add_voice("premade", "Rachel", Some("premade"));
        h.provider.script_clone(Err(limit_error()));

        let result = h
            .orchestrator
            .synthesize(request(Some("s1"), Some(recording())))
            .await
            .unwrap();

        assert_eq!(result.source, VoiceSource::ClonedVoice);
        assert_eq!(result.voice_id, "cloned-1");
        assert_eq!(h.provider.list_calls(), 1);
        assert_eq!(h.provider.clone_attempts(), 2);
        assert_eq!(h.provider.deleted(), vec!["old-1"]);
        assert!(h.provider.voice_ids().contains(&"premade".to_string()));
    }

    #[tokio::test]
    async fn test_resource_limit_retry_failure_falls_back() {
        let h = harness();
        h.provider.script_clone(Err(limit_error()));
        h.provider.script_clone(Err(limit_error()));

        let result = h
            .orchestrator
            .synthesize(request(Some("s1"), Some(recording())))
            .await
            .unwrap();

        assert_eq!(result.fallback, Some(FallbackReason::CloneFailed));
        assert_eq!(h.provider.clone_attempts(), 2);
        assert_eq!(h.provider.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_undecodable_audio_falls_back() {
        let h = harness();
        let garbage = format!("data:audio/webm;base64,{}", "!".repeat(200));
        let result = h
            .orchestrator
            .synthesize(request(Some("s1"), Some(garbage)))
            .await
            .unwrap();

        assert_eq!(result.fallback, Some(FallbackReason::UndecodableAudio));
        assert_eq!(h.provider.clone_attempts(), 0);
    }

    #[tokio::test]
    async fn test_zero_soft_deadline_skips_cloning() {
        let h = harness_with(SynthesisConfig::with_defaults().with_soft_deadline(Duration::ZERO));
        let result = h
            .orchestrator
            .synthesize(request(Some("s1"), Some(recording())))
            .await
            .unwrap();

        assert_eq!(result.fallback, Some(FallbackReason::SoftDeadline));
        assert_eq!(h.provider.clone_attempts(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_clone_is_cached_but_default_voice_answers() {
        let h = harness();
        h.provider.set_clone_delay(Duration::from_secs(9));

        let result = h
            .orchestrator
            .synthesize(request(Some("s1"), Some(recording())))
            .await
            .unwrap();

        assert_eq!(result.fallback, Some(FallbackReason::SoftDeadline));
        let cached = h.orchestrator.cache().get("s1", h.clock.now()).await.unwrap();
        assert_eq!(cached.voice_id, "cloned-1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_provider_timeout_counts_as_failure() {
        let h = harness_with(
            SynthesisConfig::with_defaults()
                .with_soft_deadline(Duration::from_secs(60))
                .with_provider_timeout(Duration::from_secs(5)),
        );
        h.provider.set_clone_delay(Duration::from_secs(30));

        let result = h
            .orchestrator
            .synthesize(request(Some("s1"), Some(recording())))
            .await
            .unwrap();

        assert_eq!(result.fallback, Some(FallbackReason::CloneFailed));
        assert!(h.orchestrator.cached_sessions().await.is_empty());
    }

    #[tokio::test]
    async fn test_clone_without_session_is_deleted_after_use() {
        let h = harness();
        let result = h
            .orchestrator
            .synthesize(request(None, Some(recording())))
            .await
            .unwrap();
        h.orchestrator.settle_cleanup().await;

        assert_eq!(result.source, VoiceSource::ClonedVoice);
        assert_eq!(h.provider.deleted(), vec!["cloned-1"]);
        assert!(h.orchestrator.cached_sessions().await.is_empty());
    }

    #[tokio::test]
    async fn test_speak_uses_cached_voice_when_requested() {
        let h = harness();
        h.orchestrator
            .cache()
            .put("s1", "v1", "hi", h.clock.now())
            .await;

        let cloned = h.orchestrator.speak(Some("s1"), "Hello", true).await.unwrap();
        assert_eq!(cloned.source, VoiceSource::CachedVoice);

        let plain = h.orchestrator.speak(Some("s1"), "Hello", false).await.unwrap();
        assert_eq!(plain.fallback, Some(FallbackReason::ClonedVoiceNotRequested));
        assert_eq!(h.provider.clone_attempts(), 0);
    }

    #[tokio::test]
    async fn test_speak_evicts_and_deletes_failing_voice() {
        let h = harness();
        h.orchestrator
            .cache()
            .put("s1", "v1", "hi", h.clock.now())
            .await;
        h.provider.fail_synthesis_for("v1");

        let result = h.orchestrator.speak(Some("s1"), "Hello", true).await.unwrap();
        h.orchestrator.settle_cleanup().await;

        assert_eq!(result.fallback, Some(FallbackReason::CachedSynthesisFailed));
        assert_eq!(h.provider.deleted(), vec!["v1"]);
        assert!(h.orchestrator.cached_sessions().await.is_empty());
    }

    #[tokio::test]
    async fn test_speak_without_cache_entry() {
        let h = harness();
        let result = h.orchestrator.speak(Some("s1"), "Hello", true).await.unwrap();
        assert_eq!(result.fallback, Some(FallbackReason::NoCachedVoice));
    }

    #[tokio::test]
    async fn test_end_session_deletes_voice() {
        let h = harness();
        h.orchestrator
            .cache()
            .put("s1", "v1", "hi", h.clock.now())
            .await;

        assert!(h.orchestrator.end_session("s1").await);
        assert!(!h.orchestrator.end_session("s1").await);
        h.orchestrator.settle_cleanup().await;
        assert_eq!(h.provider.deleted(), vec!["v1"]);
    }

    #[tokio::test]
    async fn test_sweep_deletes_outside_cache() {
        let h = harness();
        let cache = h.orchestrator.cache();
        cache.put("a", "v-a", "", h.clock.now()).await;
        h.clock.advance(20 * MINUTE);
        cache.put("b", "v-b", "", h.clock.now()).await;
        h.clock.advance(15 * MINUTE);

        let report = h.orchestrator.sweep_expired().await;

        assert_eq!(
            report,
            SweepReport {
                evicted: 1,
                deleted: 1,
                failed: 0
            }
        );
        assert_eq!(h.provider.deleted(), vec!["v-a"]);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_sweep_reports_failed_deletions() {
        let h = harness();
        h.orchestrator.cache().put("a", "v-a", "", h.clock.now()).await;
        h.provider.fail_deletes();
        h.clock.advance(31 * MINUTE);

        let report = h.orchestrator.sweep_expired().await;
        assert_eq!(report.failed, 1);
        assert!(h.orchestrator.cache().is_empty().await);
    }

    #[tokio::test]
    async fn test_cleanup_keeps_listing_order_without_timestamps() {
        let h = harness();
        h.provider.add_voice("x1", "user_voice_alpha", Some("cloned"));
        h.provider.add_voice("x2", "user_voice_beta", Some("cloned"));
        h.provider.add_voice("x3", "user_voice_gamma", Some("cloned"));

        let report = h.orchestrator.cleanup_voices(1).await.unwrap();
        assert_eq!(report.examined, 3);
        assert_eq!(report.deleted, vec!["x1", "x2"]);
    }
}
