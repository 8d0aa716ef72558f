//! Background expiry sweep for the voice-clone cache.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::synthesis::SynthesisOrchestrator;

/// Periodically evicts expired cache entries and deletes their voices.
///
/// The first sweep happens one full interval after [`start`](Self::start).
pub struct CacheSweeper {
    orchestrator: Arc<SynthesisOrchestrator>,
    interval: Duration,
    cancel_token: CancellationToken,
}

impl CacheSweeper {
    pub fn new(orchestrator: Arc<SynthesisOrchestrator>, interval: Duration) -> Self {
        Self {
            orchestrator,
            interval,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Tie the sweeper to an externally owned token (e.g. process shutdown).
    #[must_use]
    pub fn with_cancel_token(mut self, cancel_token: CancellationToken) -> Self {
        self.cancel_token = cancel_token;
        self
    }

    /// Spawn the sweep loop onto the current runtime.
    pub fn start(self) -> SweeperHandle {
        let cancel_token = self.cancel_token.clone();
        let join = tokio::spawn(self.run());
        SweeperHandle { cancel_token, join }
    }

    async fn run(self) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        debug!(
            target: "shadowme.cache",
            interval_secs = self.interval.as_secs(),
            "Starting cache sweeper"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = self.orchestrator.sweep_expired().await;
                    debug!(
                        target: "shadowme.cache",
                        evicted = report.evicted,
                        "Cache sweep finished"
                    );
                }
                () = self.cancel_token.cancelled() => {
                    debug!(target: "shadowme.cache", "Cache sweeper cancelled");
                    break;
                }
            }
        }
    }
}

/// Handle to a running [`CacheSweeper`].
pub struct SweeperHandle {
    cancel_token: CancellationToken,
    join: JoinHandle<()>,
}

impl SweeperHandle {
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Cancel the loop and wait for it to exit.
    pub async fn shutdown(self) {
        self.cancel_token.cancel();
        if let Err(e) = self.join.await {
            warn!(target: "shadowme.cache", error = %e, "Cache sweeper task failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SynthesisConfig;
    use crate::ports::Clock;
    use crate::services::VoiceCloneCache;
    use crate::testing::{FakeVoiceProvider, ManualClock};

    const SWEEP: Duration = Duration::from_secs(600);

    fn setup() -> (Arc<FakeVoiceProvider>, Arc<ManualClock>, Arc<SynthesisOrchestrator>) {
        let config = SynthesisConfig::with_defaults();
        let provider = Arc::new(FakeVoiceProvider::new());
        let clock = Arc::new(ManualClock::at_epoch());
        let cache = Arc::new(VoiceCloneCache::new(config.cache_ttl));
        let orchestrator = Arc::new(SynthesisOrchestrator::new(
            provider.clone(),
            cache,
            clock.clone(),
            config,
        ));
        (provider, clock, orchestrator)
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_evicts_on_tick() {
        let (provider, clock, orchestrator) = setup();
        orchestrator.cache().put("s1", "v1", "hi", clock.now()).await;
        clock.advance(Duration::from_secs(31 * 60));

        let handle = CacheSweeper::new(orchestrator.clone(), SWEEP).start();

        // Nothing happens before the first interval elapses.
        tokio::time::sleep(SWEEP / 2).await;
        assert_eq!(orchestrator.cache().len().await, 1);

        tokio::time::sleep(SWEEP).await;
        assert!(orchestrator.cache().is_empty().await);
        assert_eq!(provider.deleted(), vec!["v1"]);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_loop() {
        let (_provider, _clock, orchestrator) = setup();
        let handle = CacheSweeper::new(orchestrator, SWEEP).start();
        let token = handle.cancel_token();

        handle.shutdown().await;
        assert!(token.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_external_token_cancels() {
        let (_provider, _clock, orchestrator) = setup();
        let token = CancellationToken::new();
        let handle = CacheSweeper::new(orchestrator, SWEEP)
            .with_cancel_token(token.clone())
            .start();

        token.cancel();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(handle.is_finished());
    }
}
