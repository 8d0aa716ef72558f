//! Core domain for the ShadowME voice service.
//!
//! This crate owns the session-scoped voice-clone cache, the synthesis
//! orchestrator that chains cached, cloned and default voices, and the port
//! traits that adapters implement (voice provider, progress repository,
//! clock). It has no knowledge of HTTP, SQL or any concrete provider.
#![deny(unused_crate_dependencies)]

pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export commonly used types for convenience
pub use config::{
    ConfigError, DEFAULT_CACHE_TTL, DEFAULT_SOFT_DEADLINE, DEFAULT_SWEEP_INTERVAL,
    DEFAULT_VOICE_ID, SynthesisConfig, validate_config,
};
pub use domain::{
    AudioDecodeError, AudioFormat, AudioSample, DAILY_GOAL_SECONDS, DailyProgress, PracticeRecord,
    VoiceCloneEntry,
};
pub use ports::{
    Clock, CloneRequest, CoreError, ProgressRepository, ProviderError, ProviderResult,
    ProviderVoice, RepositoryError, SynthesizedAudio, SystemClock, VoiceProfile,
    VoiceProviderPort, VoiceSettings,
};
pub use services::{
    CacheSweeper, CleanupReport, FallbackReason, ProgressService, SweepReport, SweeperHandle,
    Synthesis, SynthesisError, SynthesisOrchestrator, SynthesisRequest, TERMINAL_FAILURE_MESSAGE,
    VoiceCloneCache, VoiceSource,
};

// Silence unused dev-dependency warnings
#[cfg(test)]
use tokio_test as _;
