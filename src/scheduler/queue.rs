//! Generation request queue management.

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::time::Instant;

use super::admission::{QueueResult, RateLimitResult, Rejection};
use super::cooldown::CooldownTracker;
use super::item::QueueItem;
use crate::telemetry;

/// Errors from building a queue configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("max_size must be at least 1")]
    ZeroCapacity,
    #[error("cooldown_seconds must be a non-negative number of seconds a Duration can hold (got {0})")]
    InvalidCooldown(f64),
}

/// Configuration for the generation queue. Fixed once the queue is built.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationQueueConfig {
    max_size: usize,
    cooldown: Duration,
}

impl GenerationQueueConfig {
    pub fn new(max_size: usize, cooldown_seconds: f64) -> Result<Self, ConfigError> {
        if max_size == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        let cooldown = Duration::try_from_secs_f64(cooldown_seconds)
            .map_err(|_| ConfigError::InvalidCooldown(cooldown_seconds))?;
        Ok(Self { max_size, cooldown })
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}

impl Default for GenerationQueueConfig {
    fn default() -> Self {
        Self { max_size: 10, cooldown: Duration::from_secs(30) }
    }
}

struct QueueState {
    items: VecDeque<QueueItem>,
    cooldowns: CooldownTracker,
}

/// Bounded FIFO of generation requests with per-submitter cooldown.
///
/// Producers call [`enqueue`](Self::enqueue); a consumer polls
/// [`dequeue`](Self::dequeue). Every operation is short, synchronous
/// bookkeeping under one lock, so the queue can be shared behind an `Arc`
/// by any number of producers and consumers.
pub struct GenerationQueue {
    state: Mutex<QueueState>,
    max_size: usize,
}

impl GenerationQueue {
    pub fn new(config: GenerationQueueConfig) -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(config.max_size),
                cooldowns: CooldownTracker::new(config.cooldown),
            }),
            max_size: config.max_size,
        }
    }

    /// Try to admit a request. Cooldown is checked before capacity so a
    /// rate-limited submitter always sees their retry delay.
    pub fn enqueue(&self, prompt: impl Into<String>, submitter: impl Into<String>) -> QueueResult {
        let submitter = submitter.into();
        let now = Instant::now();

        let mut state = self.state.lock();
        let rate = state.cooldowns.check(&submitter, now);
        if !rate.allowed {
            drop(state);
            let retry_after_seconds = rate.retry_after_seconds.unwrap_or_default();
            return self.reject(&submitter, Rejection::RateLimited { retry_after_seconds });
        }
        if state.items.len() >= self.max_size {
            drop(state);
            return self.reject(&submitter, Rejection::QueueFull);
        }

        let item = QueueItem::new(prompt.into(), submitter, now);
        let request_id = item.request_id;
        state.cooldowns.record(&item.submitter, now);
        state.items.push_back(item);
        let position = state.items.len();
        drop(state);

        tracing::debug!(%request_id, position, "generation request accepted");
        telemetry::record_admission("accepted");
        telemetry::record_queue_depth(position);
        QueueResult::accepted(position)
    }

    fn reject(&self, submitter: &str, rejection: Rejection) -> QueueResult {
        tracing::debug!(submitter, reason = rejection.label(), "generation request rejected");
        telemetry::record_admission(rejection.label());
        QueueResult::rejected(rejection)
    }

    /// Remove the oldest request. `None` means there is nothing to do yet.
    pub fn dequeue(&self) -> Option<QueueItem> {
        let mut state = self.state.lock();
        let item = state.items.pop_front()?;
        let depth = state.items.len();
        drop(state);

        telemetry::record_queue_depth(depth);
        Some(item)
    }

    /// Check the cooldown for `submitter` without changing any state.
    pub fn check_rate_limit(&self, submitter: &str) -> RateLimitResult {
        self.state.lock().cooldowns.check(submitter, Instant::now())
    }

    /// Number of requests waiting.
    pub fn depth(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depth() == 0
    }

    pub fn is_full(&self) -> bool {
        self.depth() >= self.max_size
    }

    /// Whether notifiers should show degraded status.
    ///
    /// Degraded exactly when the queue is at capacity, which makes this the
    /// same signal as [`is_full`](Self::is_full).
    pub fn health_degraded(&self) -> bool {
        self.is_full()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn cooldown(&self) -> Duration {
        self.state.lock().cooldowns.cooldown()
    }

    /// Number of submitters with a recorded cooldown timestamp.
    pub fn tracked_submitters(&self) -> usize {
        self.state.lock().cooldowns.tracked()
    }
}

impl Default for GenerationQueue {
    fn default() -> Self {
        Self::new(GenerationQueueConfig::default())
    }
}

impl std::fmt::Debug for GenerationQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationQueue")
            .field("depth", &self.depth())
            .field("max_size", &self.max_size)
            .finish()
    }
}
