//! Admission outcomes returned to producers.
//!
//! Rejections are ordinary data, not errors: a producer is expected to relay
//! [`QueueResult::message`] back to the submitter and move on.

use serde::Serialize;
use thiserror::Error;

/// Message returned with every accepted request.
pub const ACCEPTED_MESSAGE: &str = "Accepted";

/// Why an enqueue attempt was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    #[error("Rate limited. Retry in {retry_after_seconds:.1}s.")]
    RateLimited { retry_after_seconds: f64 },
    #[error("Queue is full.")]
    QueueFull,
}

impl Rejection {
    /// Stable label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::RateLimited { .. } => "rate_limited",
            Self::QueueFull => "queue_full",
        }
    }
}

/// Outcome of one enqueue attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueResult {
    pub accepted: bool,
    /// Human-readable reason, always present.
    pub message: String,
    /// 1-based FIFO position at the moment of acceptance.
    pub position: Option<usize>,
    pub rejection: Option<Rejection>,
}

impl QueueResult {
    pub(super) fn accepted(position: usize) -> Self {
        Self {
            accepted: true,
            message: ACCEPTED_MESSAGE.to_string(),
            position: Some(position),
            rejection: None,
        }
    }

    pub(super) fn rejected(rejection: Rejection) -> Self {
        Self {
            accepted: false,
            message: rejection.to_string(),
            position: None,
            rejection: Some(rejection),
        }
    }
}

/// Outcome of a per-submitter cooldown check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateLimitResult {
    pub allowed: bool,
    /// Remaining cooldown; `Some` and strictly positive only when denied.
    pub retry_after_seconds: Option<f64>,
}

impl RateLimitResult {
    pub fn allow() -> Self {
        Self { allowed: true, retry_after_seconds: None }
    }

    pub fn deny(retry_after_seconds: f64) -> Self {
        Self { allowed: false, retry_after_seconds: Some(retry_after_seconds) }
    }
}
