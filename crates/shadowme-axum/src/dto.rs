//! Response DTOs for the diagnostic and progress endpoints.
//!
//! camelCase on the wire to match the browser client.

use chrono::{DateTime, Utc};
use serde::Serialize;

use shadowme_core::{DailyProgress, ProviderVoice, VoiceCloneEntry};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionsResponse {
    pub count: usize,
    pub sessions: Vec<VoiceCloneEntry>,
}

/// A cloned voice created by this service.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserVoiceDto {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
}

impl From<ProviderVoice> for UserVoiceDto {
    fn from(voice: ProviderVoice) -> Self {
        Self {
            id: voice.voice_id,
            name: voice.name,
            category: voice.category,
        }
    }
}

/// Provider voice inventory.
///
/// On provider failure `success` is false and `error` carries the reason;
/// the inventory fields are then zero.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceInventoryResponse {
    pub success: bool,
    pub total_voices: usize,
    pub user_voices: usize,
    pub user_voice_list: Vec<UserVoiceDto>,
    /// `valid`, `invalid` or `unknown`.
    pub api_key_status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub api_key_exists: bool,
    /// First characters of the key followed by `...`, or `Not found`.
    pub api_key_prefix: String,
    pub cached_sessions: usize,
    pub cache_ttl_secs: u64,
    pub default_voice_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyProgressResponse {
    pub user_id: String,
    pub total_practice_seconds: u64,
    pub goal_days: usize,
    /// Oldest first, ending today.
    pub days: Vec<DailyProgress>,
}

impl WeeklyProgressResponse {
    pub fn new(user_id: impl Into<String>, days: Vec<DailyProgress>) -> Self {
        Self {
            user_id: user_id.into(),
            total_practice_seconds: days.iter().map(|d| u64::from(d.practice_seconds)).sum(),
            goal_days: days.iter().filter(|d| d.goal_achieved).count(),
            days,
        }
    }
}
