//! Session-scoped cache of cloned voices.
//!
//! Maps a client session id to the provider voice cloned for it. Purely
//! in-memory; remote clean-up of evicted voices is the orchestrator's job.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::VoiceCloneEntry;

/// In-memory table of [`VoiceCloneEntry`] keyed by session id.
///
/// All operations take the current time explicitly so expiry is decided by
/// the caller's clock. A single lock guards the whole map.
#[derive(Debug)]
pub struct VoiceCloneCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, VoiceCloneEntry>>,
}

impl VoiceCloneCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The entry for `session_id` if it is still live at `now`.
    ///
    /// Does not bump `last_used_at`; call [`touch`](Self::touch) once the
    /// voice has actually been used.
    pub async fn get(&self, session_id: &str, now: DateTime<Utc>) -> Option<VoiceCloneEntry> {
        let entries = self.entries.read().await;
        entries
            .get(session_id)
            .filter(|entry| entry.is_live(now, self.ttl))
            .cloned()
    }

    /// Insert or overwrite the entry for a session.
    ///
    /// Returns the replaced entry, whose voice the caller should delete
    /// remotely.
    pub async fn put(
        &self,
        session_id: &str,
        voice_id: &str,
        sample_text: &str,
        now: DateTime<Utc>,
    ) -> Option<VoiceCloneEntry> {
        let entry = VoiceCloneEntry::new(session_id, voice_id, sample_text, now);
        let previous = self
            .entries
            .write()
            .await
            .insert(session_id.to_string(), entry);
        debug!(
            target: "shadowme.cache",
            session_id,
            voice_id,
            replaced = previous.is_some(),
            "Cached cloned voice"
        );
        previous
    }

    /// Mark the session's entry as used at `now`.
    ///
    /// The TTL is not rechecked here; liveness is decided at lookup. Returns
    /// false if the session is gone or now references another voice.
    pub async fn touch(&self, session_id: &str, voice_id: &str, now: DateTime<Utc>) -> bool {
        let mut entries = self.entries.write().await;
        match entries.get_mut(session_id) {
            Some(entry) if entry.voice_id == voice_id => {
                entry.last_used_at = now;
                true
            }
            _ => false,
        }
    }

    pub async fn remove(&self, session_id: &str) -> Option<VoiceCloneEntry> {
        self.entries.write().await.remove(session_id)
    }

    /// Remove the session's entry only if it still references `voice_id`.
    ///
    /// Guards against evicting a newer clone stored by a concurrent request.
    pub async fn remove_if_voice(&self, session_id: &str, voice_id: &str) -> Option<VoiceCloneEntry> {
        let mut entries = self.entries.write().await;
        if entries
            .get(session_id)
            .is_some_and(|entry| entry.voice_id == voice_id)
        {
            entries.remove(session_id)
        } else {
            None
        }
    }

    /// Remove and return the session's entry if it is present but expired.
    pub async fn take_expired(&self, session_id: &str, now: DateTime<Utc>) -> Option<VoiceCloneEntry> {
        let mut entries = self.entries.write().await;
        if entries
            .get(session_id)
            .is_some_and(|entry| !entry.is_live(now, self.ttl))
        {
            entries.remove(session_id)
        } else {
            None
        }
    }

    /// Remove and return every entry idle for at least the TTL.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> Vec<VoiceCloneEntry> {
        let mut entries = self.entries.write().await;
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| !entry.is_live(now, self.ttl))
            .map(|(session_id, _)| session_id.clone())
            .collect();

        expired
            .iter()
            .filter_map(|session_id| entries.remove(session_id))
            .collect()
    }

    /// All entries, ordered by session id.
    pub async fn snapshot(&self) -> Vec<VoiceCloneEntry> {
        let mut entries: Vec<VoiceCloneEntry> =
            self.entries.read().await.values().cloned().collect();
        entries.sort_by(|a, b| a.session_id.cmp(&b.session_id));
        entries
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
