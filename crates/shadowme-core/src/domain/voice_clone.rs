//! Cached cloned-voice entries.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A provider-side cloned voice bound to one client session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceCloneEntry {
    /// Opaque, client-chosen session identifier (the cache key).
    pub session_id: String,
    /// Provider-assigned identifier of the cloned voice.
    pub voice_id: String,
    pub created_at: DateTime<Utc>,
    /// Bumped on every successful synthesis with this voice.
    pub last_used_at: DateTime<Utc>,
    /// Text that accompanied the original clone. Diagnostics only.
    pub sample_text: String,
}

impl VoiceCloneEntry {
    /// Create an entry whose creation and last-use times are both `now`.
    pub fn new(
        session_id: impl Into<String>,
        voice_id: impl Into<String>,
        sample_text: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            voice_id: voice_id.into(),
            created_at: now,
            last_used_at: now,
            sample_text: sample_text.into(),
        }
    }

    /// Time elapsed since the last successful use.
    ///
    /// A `now` earlier than `last_used_at` (clock skew) counts as zero.
    pub fn idle_for(&self, now: DateTime<Utc>) -> Duration {
        (now - self.last_used_at).to_std().unwrap_or(Duration::ZERO)
    }

    /// An entry is live while its idle time is strictly below the TTL.
    pub fn is_live(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.idle_for(now) < ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_new_entry_timestamps_match() {
        let entry = VoiceCloneEntry::new("s1", "v1", "hi", t0());
        assert_eq!(entry.created_at, entry.last_used_at);
        assert_eq!(entry.sample_text, "hi");
    }

    #[test]
    fn test_liveness_boundary_is_exclusive() {
        let ttl = Duration::from_secs(30 * 60);
        let entry = VoiceCloneEntry::new("s1", "v1", "hi", t0());

        let just_before = t0() + chrono::Duration::seconds(30 * 60 - 1);
        let exactly = t0() + chrono::Duration::seconds(30 * 60);

        assert!(entry.is_live(just_before, ttl));
        assert!(!entry.is_live(exactly, ttl));
    }

    #[test]
    fn test_clock_skew_counts_as_fresh() {
        let entry = VoiceCloneEntry::new("s1", "v1", "hi", t0());
        let earlier = t0() - chrono::Duration::minutes(5);
        assert_eq!(entry.idle_for(earlier), Duration::ZERO);
        assert!(entry.is_live(earlier, Duration::from_secs(1)));
    }

    #[test]
    fn test_serializes_camel_case() {
        let entry = VoiceCloneEntry::new("s1", "v1", "hi", t0());
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["sessionId"], "s1");
        assert_eq!(json["voiceId"], "v1");
        assert!(json.get("lastUsedAt").is_some());
    }
}
