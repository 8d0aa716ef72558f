//! Synthesis configuration and validation.
//!
//! The TTL, sweep period and soft deadline were originally tuned for a
//! serverless host with a ~10 second execution limit. Here they are plain
//! configuration with defaults matching that deployment.

use std::time::Duration;

use thiserror::Error;

use crate::ports::{VoiceProfile, VoiceSettings};

/// Idle time after which a cached cloned voice is considered expired.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30 * 60);

/// Period of the background expiry sweep.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Elapsed request time after which cloning is abandoned for the default voice.
pub const DEFAULT_SOFT_DEADLINE: Duration = Duration::from_secs(8);

/// Upper bound on a single provider call.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(20);

/// Minimum length of the embedded audio payload worth cloning from.
pub const DEFAULT_MIN_AUDIO_CHARS: usize = 100;

/// Cloned voices kept alive by a resource-limit cleanup pass.
pub const DEFAULT_KEEP_RECENT_VOICES: usize = 2;

/// Provider-supplied fallback voice ("Rachel").
pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";

/// Name prefix of every voice this service clones.
pub const DEFAULT_CLONE_NAME_PREFIX: &str = "user_voice_";

const DEFAULT_CLONE_DESCRIPTION: &str = "User voice for pronunciation learning";

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Cache TTL must be greater than zero")]
    ZeroCacheTtl,

    #[error("Sweep interval must be greater than zero")]
    ZeroSweepInterval,

    #[error("Provider timeout must be greater than zero")]
    ZeroProviderTimeout,

    #[error("Default voice id must not be empty")]
    MissingDefaultVoice,

    #[error("Clone name prefix must not be empty")]
    MissingClonePrefix,
}

/// Tunables for the cache manager and the synthesis orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisConfig {
    pub cache_ttl: Duration,
    pub sweep_interval: Duration,
    pub soft_deadline: Duration,
    pub provider_timeout: Duration,
    pub min_audio_chars: usize,
    pub keep_recent_voices: usize,
    pub default_voice_id: String,
    pub clone_name_prefix: String,
    pub clone_description: String,
    /// Model and voice settings used with a cloned voice.
    pub cloned_voice_profile: VoiceProfile,
    /// Model and baseline voice settings used with the default voice.
    pub default_voice_profile: VoiceProfile,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl SynthesisConfig {
    /// Create a configuration matching the original deployment.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            soft_deadline: DEFAULT_SOFT_DEADLINE,
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
            min_audio_chars: DEFAULT_MIN_AUDIO_CHARS,
            keep_recent_voices: DEFAULT_KEEP_RECENT_VOICES,
            default_voice_id: DEFAULT_VOICE_ID.to_string(),
            clone_name_prefix: DEFAULT_CLONE_NAME_PREFIX.to_string(),
            clone_description: DEFAULT_CLONE_DESCRIPTION.to_string(),
            cloned_voice_profile: VoiceProfile {
                model_id: "eleven_multilingual_v2".to_string(),
                settings: VoiceSettings {
                    stability: 0.7,
                    similarity_boost: 0.8,
                    style: Some(0.5),
                    use_speaker_boost: Some(true),
                },
            },
            default_voice_profile: VoiceProfile {
                model_id: "eleven_monolingual_v1".to_string(),
                settings: VoiceSettings {
                    stability: 0.7,
                    similarity_boost: 0.8,
                    style: None,
                    use_speaker_boost: None,
                },
            },
        }
    }

    #[must_use]
    pub const fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    #[must_use]
    pub const fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    #[must_use]
    pub const fn with_soft_deadline(mut self, deadline: Duration) -> Self {
        self.soft_deadline = deadline;
        self
    }

    #[must_use]
    pub const fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_min_audio_chars(mut self, chars: usize) -> Self {
        self.min_audio_chars = chars;
        self
    }

    #[must_use]
    pub const fn with_keep_recent_voices(mut self, keep: usize) -> Self {
        self.keep_recent_voices = keep;
        self
    }

    #[must_use]
    pub fn with_default_voice(mut self, voice_id: impl Into<String>) -> Self {
        self.default_voice_id = voice_id.into();
        self
    }
}

/// Validate a synthesis configuration.
pub fn validate_config(config: &SynthesisConfig) -> Result<(), ConfigError> {
    if config.cache_ttl.is_zero() {
        return Err(ConfigError::ZeroCacheTtl);
    }
    if config.sweep_interval.is_zero() {
        return Err(ConfigError::ZeroSweepInterval);
    }
    if config.provider_timeout.is_zero() {
        return Err(ConfigError::ZeroProviderTimeout);
    }
    if config.default_voice_id.trim().is_empty() {
        return Err(ConfigError::MissingDefaultVoice);
    }
    if config.clone_name_prefix.is_empty() {
        return Err(ConfigError::MissingClonePrefix);
    }
    Ok(())
}
