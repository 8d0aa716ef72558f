//! Test doubles for the core ports.
//!
//! Enabled by the `test-utils` feature so adapter crates can drive the
//! orchestrator without a network or database.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeDelta, TimeZone, Utc};

use crate::domain::DailyProgress;
use crate::ports::{
    Clock, CloneRequest, ProgressRepository, ProviderError, ProviderResult, ProviderVoice,
    RepositoryError, SynthesizedAudio, VoiceProfile, VoiceProviderPort,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// A clock starting at 2025-01-01T00:00:00Z.
    pub fn at_epoch() -> Self {
        Self::new(Utc.timestamp_opt(1_735_689_600, 0).single().unwrap_or_default())
    }

    pub fn advance(&self, by: Duration) {
        let delta = TimeDelta::from_std(by).unwrap_or(TimeDelta::MAX);
        let mut now = lock(&self.now);
        *now += delta;
    }

}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *lock(&self.now)
    }
}

/// One recorded call against [`FakeVoiceProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    CreateVoice { name: String, file_name: String },
    Synthesize { voice_id: String, model_id: String, text: String },
    DeleteVoice { voice_id: String },
    ListVoices,
}

#[derive(Default)]
struct FakeState {
    scripted_clones: VecDeque<ProviderResult<String>>,
    clone_failure: Option<ProviderError>,
    clone_delay: Duration,
    synthesis_latency: Option<(Arc<ManualClock>, Duration)>,
    failing_voices: HashSet<String>,
    synthesis_failure: Option<ProviderError>,
    delete_failure: Option<ProviderError>,
    list_failure: Option<ProviderError>,
    voices: Vec<ProviderVoice>,
    calls: Vec<ProviderCall>,
    next_clone: usize,
}

/// Scriptable in-memory voice provider.
///
/// Successful clones are named `cloned-1`, `cloned-2`, ... and join the
/// voice inventory with category `cloned`. Synthesized audio is the UTF-8
/// string `audio:<voice_id>:<text>`.
#[derive(Default)]
pub struct FakeVoiceProvider {
    state: Mutex<FakeState>,
}

impl FakeVoiceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result of the next `create_voice` call.
    pub fn script_clone(&self, result: ProviderResult<String>) {
        lock(&self.state).scripted_clones.push_back(result);
    }

    /// Fail every unscripted `create_voice` call.
    pub fn fail_clones_with(&self, error: ProviderError) {
        lock(&self.state).clone_failure = Some(error);
    }

    /// Delay each `create_voice` call (use with paused tokio time).
    pub fn set_clone_delay(&self, delay: Duration) {
        lock(&self.state).clone_delay = delay;
    }

    /// Advance `clock` by `latency` during each `synthesize` call.
    pub fn set_synthesis_latency(&self, clock: Arc<ManualClock>, latency: Duration) {
        lock(&self.state).synthesis_latency = Some((clock, latency));
    }

    pub fn fail_synthesis_for(&self, voice_id: &str) {
        lock(&self.state).failing_voices.insert(voice_id.to_string());
    }

    pub fn fail_all_synthesis(&self) {
        lock(&self.state).synthesis_failure = Some(ProviderError::Unavailable {
            message: "synthesis offline".to_string(),
        });
    }

    pub fn fail_deletes(&self) {
        lock(&self.state).delete_failure = Some(ProviderError::Unavailable {
            message: "delete offline".to_string(),
        });
    }

    pub fn fail_listing(&self) {
        lock(&self.state).list_failure = Some(ProviderError::Unavailable {
            message: "list offline".to_string(),
        });
    }

    /// Add a voice to the inventory.
    pub fn add_voice(&self, voice_id: &str, name: &str, category: Option<&str>) {
        lock(&self.state).voices.push(ProviderVoice {
            voice_id: voice_id.to_string(),
            name: name.to_string(),
            category: category.map(str::to_string),
        });
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        lock(&self.state).calls.clone()
    }

    pub fn clone_attempts(&self) -> usize {
        self.count(|call| matches!(call, ProviderCall::CreateVoice { .. }))
    }

    pub fn list_calls(&self) -> usize {
        self.count(|call| matches!(call, ProviderCall::ListVoices))
    }

    /// Voice ids passed to `synthesize`, in call order.
    pub fn synthesized_with(&self) -> Vec<String> {
        lock(&self.state)
            .calls
            .iter()
            .filter_map(|call| match call {
                ProviderCall::Synthesize { voice_id, .. } => Some(voice_id.clone()),
                _ => None,
            })
            .collect()
    }

    /// Voice ids passed to `delete_voice`, in call order.
    pub fn deleted(&self) -> Vec<String> {
        lock(&self.state)
            .calls
            .iter()
            .filter_map(|call| match call {
                ProviderCall::DeleteVoice { voice_id } => Some(voice_id.clone()),
                _ => None,
            })
            .collect()
    }

    /// Ids currently in the inventory.
    pub fn voice_ids(&self) -> Vec<String> {
        lock(&self.state)
            .voices
            .iter()
            .map(|voice| voice.voice_id.clone())
            .collect()
    }

    fn count(&self, pred: impl Fn(&ProviderCall) -> bool) -> usize {
        lock(&self.state).calls.iter().filter(|call| pred(call)).count()
    }
}

#[async_trait]
impl VoiceProviderPort for FakeVoiceProvider {
    async fn create_voice(&self, request: &CloneRequest) -> ProviderResult<String> {
        let delay = {
            let mut state = lock(&self.state);
            state.calls.push(ProviderCall::CreateVoice {
                name: request.name.clone(),
                file_name: request.sample.file_name(),
            });
            state.clone_delay
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut state = lock(&self.state);
        let result = match state.scripted_clones.pop_front() {
            Some(scripted) => scripted,
            None => match &state.clone_failure {
                Some(error) => Err(error.clone()),
                None => {
                    state.next_clone += 1;
                    Ok(format!("cloned-{}", state.next_clone))
                }
            },
        };
        if let Ok(voice_id) = &result {
            state.voices.push(ProviderVoice {
                voice_id: voice_id.clone(),
                name: request.name.clone(),
                category: Some("cloned".to_string()),
            });
        }
        result
    }

    async fn synthesize(
        &self,
        voice_id: &str,
        text: &str,
        profile: &VoiceProfile,
    ) -> ProviderResult<SynthesizedAudio> {
        let mut state = lock(&self.state);
        if let Some((clock, latency)) = &state.synthesis_latency {
            clock.advance(*latency);
        }
        state.calls.push(ProviderCall::Synthesize {
            voice_id: voice_id.to_string(),
            model_id: profile.model_id.clone(),
            text: text.to_string(),
        });
        if let Some(error) = &state.synthesis_failure {
            return Err(error.clone());
        }
        if state.failing_voices.contains(voice_id) {
            return Err(ProviderError::Rejected {
                status: 400,
                message: format!("voice {voice_id} cannot be used"),
            });
        }
        Ok(SynthesizedAudio {
            bytes: format!("audio:{voice_id}:{text}").into_bytes(),
            content_type: "audio/mpeg".to_string(),
        })
    }

    async fn delete_voice(&self, voice_id: &str) -> ProviderResult<()> {
        let mut state = lock(&self.state);
        state.calls.push(ProviderCall::DeleteVoice {
            voice_id: voice_id.to_string(),
        });
        if let Some(error) = &state.delete_failure {
            return Err(error.clone());
        }
        state.voices.retain(|voice| voice.voice_id != voice_id);
        Ok(())
    }

    async fn list_voices(&self) -> ProviderResult<Vec<ProviderVoice>> {
        let mut state = lock(&self.state);
        state.calls.push(ProviderCall::ListVoices);
        if let Some(error) = &state.list_failure {
            return Err(error.clone());
        }
        Ok(state.voices.clone())
    }
}

/// Progress repository backed by a `BTreeMap`.
#[derive(Default)]
pub struct InMemoryProgressRepository {
    records: Mutex<BTreeMap<(String, NaiveDate), DailyProgress>>,
}

impl InMemoryProgressRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressRepository for InMemoryProgressRepository {
    async fn get(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyProgress>, RepositoryError> {
        Ok(lock(&self.records)
            .get(&(user_id.to_string(), date))
            .cloned())
    }

    async fn upsert(&self, progress: &DailyProgress) -> Result<(), RepositoryError> {
        lock(&self.records).insert(
            (progress.user_id.clone(), progress.date),
            progress.clone(),
        );
        Ok(())
    }

    async fn range(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyProgress>, RepositoryError> {
        Ok(lock(&self.records)
            .values()
            .filter(|record| record.user_id == user_id && record.date >= from && record.date <= to)
            .cloned()
            .collect())
    }
}
