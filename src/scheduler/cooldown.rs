//! Per-submitter cooldown tracking.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use super::admission::RateLimitResult;

/// Remembers when each submitter last had a request accepted.
///
/// Entries are never evicted, so the map grows with the number of distinct
/// submitters seen over the life of the queue.
#[derive(Debug)]
pub(super) struct CooldownTracker {
    cooldown: Duration,
    last_accepted: HashMap<String, Instant>,
}

impl CooldownTracker {
    pub(super) fn new(cooldown: Duration) -> Self {
        Self { cooldown, last_accepted: HashMap::new() }
    }

    /// Check whether `submitter` may be admitted at `now`. Does not mutate.
    pub(super) fn check(&self, submitter: &str, now: Instant) -> RateLimitResult {
        let Some(&last) = self.last_accepted.get(submitter) else {
            return RateLimitResult::allow();
        };
        let elapsed = now.saturating_duration_since(last);
        if elapsed >= self.cooldown {
            return RateLimitResult::allow();
        }
        RateLimitResult::deny((self.cooldown - elapsed).as_secs_f64())
    }

    /// Record an accepted request, overwriting any earlier timestamp.
    pub(super) fn record(&mut self, submitter: &str, now: Instant) {
        match self.last_accepted.get_mut(submitter) {
            Some(last) => *last = now,
            None => {
                self.last_accepted.insert(submitter.to_owned(), now);
            }
        }
    }

    pub(super) fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub(super) fn tracked(&self) -> usize {
        self.last_accepted.len()
    }
}
