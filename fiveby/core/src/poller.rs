//! Background snapshot polling
//!
//! A [`SnapshotPoller`] refreshes the store's current session on a fixed
//! interval using silent loads. Ticks that land while a foreground load is in
//! flight are skipped so polling never supersedes an explicit user load.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::AbortHandle;
use tokio::time::MissedTickBehavior;

use crate::config::PollingConfig;
use crate::store::{LoadOutcome, SessionStore};

/// Handle to a running poll loop; the loop stops when this is dropped
#[derive(Debug)]
pub struct SnapshotPoller {
    abort: AbortHandle,
    interval: Duration,
}

impl SnapshotPoller {
    /// Start polling `store` every `interval`
    ///
    /// The first refresh happens one full interval after spawning.
    #[must_use]
    pub fn spawn(store: Arc<SessionStore>, interval: Duration) -> Self {
        let handle = tokio::spawn(run(store, interval));
        tracing::debug!(?interval, "snapshot poller started");
        Self {
            abort: handle.abort_handle(),
            interval,
        }
    }

    /// Start polling per the `[polling]` config, or not at all when disabled
    #[must_use]
    pub fn from_config(store: Arc<SessionStore>, config: &PollingConfig) -> Option<Self> {
        config
            .enabled
            .then(|| Self::spawn(store, config.interval()))
    }

    /// Poll interval
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether the loop is still running
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.abort.is_finished()
    }

    /// Stop polling
    pub fn stop(&self) {
        if !self.abort.is_finished() {
            self.abort.abort();
            tracing::debug!("snapshot poller stopped");
        }
    }
}

impl Drop for SnapshotPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run(store: Arc<SessionStore>, period: Duration) {
    let start = tokio::time::Instant::now() + period;
    let mut ticker = tokio::time::interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        if store.is_foreground_loading() {
            tracing::trace!("poll tick skipped; foreground load in flight");
            continue;
        }

        match store.refresh_silent().await {
            LoadOutcome::Applied => tracing::trace!("poll refreshed snapshot"),
            LoadOutcome::Failed(_) | LoadOutcome::Superseded | LoadOutcome::Skipped => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PollingConfig;
    use crate::store::SessionStore;

    #[tokio::test]
    async fn test_disabled_config_spawns_nothing() {
        let store = Arc::new(SessionStore::new(Arc::new(crate::api::FiveByClient::new(
            "http://127.0.0.1:9",
            Duration::from_secs(1),
        )
        .unwrap())));
        let config = PollingConfig {
            interval_ms: 10,
            enabled: false,
        };
        assert!(SnapshotPoller::from_config(store, &config).is_none());
    }

    #[tokio::test]
    async fn test_stop_ends_loop() {
        let store = Arc::new(SessionStore::new(Arc::new(crate::api::FiveByClient::new(
            "http://127.0.0.1:9",
            Duration::from_secs(1),
        )
        .unwrap())));
        let poller = SnapshotPoller::spawn(store, Duration::from_secs(60));
        assert!(poller.is_running());
        assert_eq!(poller.interval(), Duration::from_secs(60));
        poller.stop();
        tokio::time::timeout(Duration::from_secs(1), async {
            while poller.is_running() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }
}
