//! Fixed-interval readiness polling for the external map SDK.
//!
//! The SDK finishes loading at most once, so there is nothing to back off
//! from: the poller re-checks on a constant interval, gives up after a bounded
//! number of attempts, and stops as soon as the owning view is torn down.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    TimedOut,
    TornDown,
}

#[derive(Debug, Clone, Copy)]
pub struct ReadinessPoller {
    interval: Duration,
    max_attempts: u32,
}

impl ReadinessPoller {
    /// `max_attempts` counts re-checks after the initial one.
    #[must_use]
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Polls `check` until it reports ready, the attempt budget runs out, or
    /// `teardown` flips to `true` (or its sender is dropped).
    pub async fn wait_until<F, Fut>(
        &self,
        mut check: F,
        teardown: &mut watch::Receiver<bool>,
    ) -> Readiness
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = bool>,
    {
        let mut attempt = 0u32;
        loop {
            if *teardown.borrow_and_update() {
                return Readiness::TornDown;
            }
            if check().await {
                return Readiness::Ready;
            }
            if attempt >= self.max_attempts {
                tracing::warn!(
                    attempts = attempt,
                    interval = ?self.interval,
                    "map SDK never became ready; giving up"
                );
                return Readiness::TimedOut;
            }
            attempt += 1;

            tokio::select! {
                () = tokio::time::sleep(self.interval) => {}
                changed = teardown.changed() => {
                    if changed.is_err() || *teardown.borrow() {
                        return Readiness::TornDown;
                    }
                }
            }
        }
    }
}
