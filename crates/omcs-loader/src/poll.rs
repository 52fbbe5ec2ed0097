//! Fixed-interval poll driver for the update-fetch cycle.
//!
//! The core treats the polling driver as an external caller; this is the
//! default one. Retry policy is fixed-interval: a failed cycle is logged and
//! the next one proceeds on schedule.

use crate::threadsafe::ThreadSafeLoader;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Configuration for the poll driver.
#[derive(Clone, Debug)]
pub struct PollConfig {
    /// Delay between update-fetch cycles (in milliseconds).
    pub interval_ms: u64,
    /// Run the first cycle immediately instead of after one interval.
    pub immediate: bool,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            immediate: false,
        }
    }
}

/// Builder for poll configuration.
pub struct PollConfigBuilder {
    config: PollConfig,
}

impl PollConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: PollConfig::default(),
        }
    }

    pub fn interval(mut self, ms: u64) -> Self {
        self.config.interval_ms = ms;
        self
    }

    pub fn immediate(mut self, enabled: bool) -> Self {
        self.config.immediate = enabled;
        self
    }

    pub fn build(self) -> PollConfig {
        self.config
    }
}

impl Default for PollConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives repeated update-fetch cycles against a shared loader until the
/// loader's cancellation token fires.
pub struct PollDriver {
    handle: JoinHandle<()>,
}

impl PollDriver {
    /// Spawn the polling task.
    pub fn spawn<T>(loader: Arc<ThreadSafeLoader<T>>, config: PollConfig) -> Self
    where
        T: Clone + PartialEq + Send + Sync + 'static,
    {
        let handle = tokio::spawn(async move {
            let cancel = loader.cancellation();
            let mut interval = tokio::time::interval(Duration::from_millis(config.interval_ms));
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            if !config.immediate {
                // The first tick of a tokio interval fires at once; consume
                // it so the first cycle waits a full period.
                interval.tick().await;
            }
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {}
                }
                match loader.refresh().await {
                    Ok(batch) => {
                        tracing::trace!(records = batch.len(), "poll cycle applied");
                    }
                    Err(err) if err.is_cancelled() => break,
                    Err(err) => {
                        tracing::warn!(error = %err, "poll cycle failed");
                    }
                }
            }
            tracing::debug!("poll driver stopped");
        });
        Self { handle }
    }

    /// Wait for the polling task to finish (it finishes once the loader is
    /// cancelled).
    pub async fn join(self) {
        let _ = self.handle.await;
    }

    /// Abort the task without waiting.
    pub fn abort(&self) {
        self.handle.abort();
    }
}
