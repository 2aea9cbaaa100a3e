//! Fixed-interval pacing between external calls.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Default pause between geocoding requests.
pub const DEFAULT_PACING_INTERVAL: Duration = Duration::from_secs(1);

/// Waits a fixed interval after each external call.
///
/// The wait is a plain delay rather than a sliding window: the caller pauses
/// after every request, including the last, regardless of how long the
/// request took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacer {
    interval: Duration,
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(DEFAULT_PACING_INTERVAL)
    }
}

impl Pacer {
    /// Pause for `interval` between calls.
    pub const fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Length of each pause.
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait one interval.
    ///
    /// Returns `false` if `cancel` fired before or during the wait.
    pub async fn pause(&self, cancel: &CancellationToken) -> bool {
        if cancel.is_cancelled() {
            return false;
        }
        if self.interval.is_zero() {
            return true;
        }
        tokio::select! {
            () = cancel.cancelled() => false,
            () = tokio::time::sleep(self.interval) => true,
        }
    }
}
