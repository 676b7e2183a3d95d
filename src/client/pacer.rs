//! Minimum-interval request pacing.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Serializes request issuance so consecutive requests start at least one
/// interval apart, regardless of caller concurrency.
///
/// The slot lock is held only long enough to reserve a start time; the wait
/// itself happens outside the lock. Overlapping callers therefore observe
/// serialized network timing, not serialized call completion.
pub struct RequestPacer {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RequestPacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(None),
        }
    }

    /// Reserve the next free start slot and wait until it arrives.
    pub async fn acquire(&self) {
        let at = {
            let mut slot = self.next_slot.lock().await;
            let now = Instant::now();
            let at = match *slot {
                Some(next) if next > now => next,
                _ => now,
            };
            *slot = Some(at + self.interval);
            at
        };
        tokio::time::sleep_until(at).await;
    }
}
