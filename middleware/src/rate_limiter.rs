//! Per-sender cool-down limiter.

use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Allows at most one action per key within `window`.
///
/// Rejected attempts do not move the window. The check-and-set runs under the map's entry
/// lock, so concurrent tasks for the same key cannot both pass.
#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    last_allowed: DashMap<i64, Instant>,
}

impl RateLimiter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_allowed: DashMap::new(),
        }
    }

    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Returns true and starts a new window if `key` is allowed now.
    pub fn try_acquire(&self, key: i64) -> bool {
        self.try_acquire_at(key, Instant::now())
    }

    pub fn try_acquire_at(&self, key: i64, now: Instant) -> bool {
        match self.last_allowed.entry(key) {
            Entry::Occupied(mut entry) => {
                if now.saturating_duration_since(*entry.get()) >= self.window {
                    entry.insert(now);
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
                true
            }
        }
    }

    /// Drops keys whose window has passed.
    pub fn prune(&self, now: Instant) {
        self.last_allowed
            .retain(|_, last| now.saturating_duration_since(*last) < self.window);
    }

    pub fn tracked_keys(&self) -> usize {
        self.last_allowed.len()
    }
}
