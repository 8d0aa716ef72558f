//! Core services - the application's business logic layer.
//!
//! Services orchestrate between ports (trait interfaces) and domain logic.
//! They don't know about concrete implementations.

mod progress_service;
mod sweeper;
mod synthesis;
mod voice_cache;

pub use progress_service::{ProgressService, WEEK_DAYS};
pub use sweeper::{CacheSweeper, SweeperHandle};
pub use synthesis::{
    CleanupReport, FallbackReason, SweepReport, Synthesis, SynthesisError, SynthesisOrchestrator,
    SynthesisRequest, TERMINAL_FAILURE_MESSAGE, VoiceSource,
};
pub use voice_cache::VoiceCloneCache;
