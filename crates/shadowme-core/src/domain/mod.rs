//! Core domain types.
//!
//! These types represent the pure domain model, independent of any
//! infrastructure concerns (HTTP, database, provider wire formats).
//!
//! # Structure
//!
//! - `voice_clone` - Cached cloned-voice entries keyed by session
//! - `audio` - Recorded audio samples and container detection
//! - `progress` - Daily practice progress records

mod audio;
mod progress;
mod voice_clone;

pub use audio::{AudioDecodeError, AudioFormat, AudioSample};
pub use progress::{DAILY_GOAL_SECONDS, DailyProgress, PracticeRecord};
pub use voice_clone::VoiceCloneEntry;
