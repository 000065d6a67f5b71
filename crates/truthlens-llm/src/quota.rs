//! Minimum spacing between successive model calls.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Spaces out calls so that no two start closer than `min_interval`.
pub struct QuotaManager {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl QuotaManager {
    pub fn new(min_interval: Duration) -> Self {
        Self { min_interval, last_call: Mutex::new(None) }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until the next call is allowed, then record it.
    ///
    /// Concurrent callers are serialised on the internal lock, so each one
    /// observes the slot recorded by the previous caller.
    pub async fn wait(&self) {
        let mut last = self.last_call.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                let delay = self.min_interval - elapsed;
                tracing::trace!(delay_ms = delay.as_millis() as u64, "pacing model call");
                tokio::time::sleep(delay).await;
            }
        }
        *last = Some(Instant::now());
    }
}

impl Default for QuotaManager {
    fn default() -> Self {
        Self::new(Duration::from_millis(30))
    }
}
