//! Queued generation request type.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;
use uuid::Uuid;

/// A single pending generation request.
///
/// Only [`GenerationQueue::enqueue`](super::GenerationQueue::enqueue) creates
/// items. Once dequeued, the caller owns the item outright.
pub struct QueueItem {
    pub request_id: Uuid,
    /// Prompt text, opaque to the queue.
    pub prompt: String,
    /// Identity used as the cooldown key.
    pub submitter: String,
    /// Monotonic creation instant. Non-decreasing across items.
    pub enqueued_at: Instant,
    /// Wall-clock creation time for logs and display.
    pub submitted_at: DateTime<Utc>,
}

impl std::fmt::Debug for QueueItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueItem")
            .field("request_id", &self.request_id)
            .field("submitter", &self.submitter)
            .field("prompt_len", &self.prompt.len())
            .field("submitted_at", &self.submitted_at)
            .finish()
    }
}

impl QueueItem {
    pub(super) fn new(prompt: String, submitter: String, enqueued_at: Instant) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            prompt,
            submitter,
            enqueued_at,
            submitted_at: Utc::now(),
        }
    }

    /// Time spent since the item was accepted.
    pub fn waited(&self) -> Duration {
        self.enqueued_at.elapsed()
    }
}
