//! Metrics recorded through the `metrics` facade.
//!
//! Nothing is exported unless the embedding process installs a recorder.

use ::metrics::{counter, gauge, histogram};

pub const ADMISSIONS_TOTAL: &str = "genqueue_admissions_total";
pub const QUEUE_DEPTH: &str = "genqueue_depth";
pub const GENERATIONS_TOTAL: &str = "genqueue_generations_total";
pub const GENERATION_LATENCY_MS: &str = "genqueue_generation_latency_ms";
pub const QUEUE_WAIT_MS: &str = "genqueue_queue_wait_ms";

/// Count one admission decision (`accepted`, `rate_limited`, `queue_full`).
pub fn record_admission(outcome: &'static str) {
    counter!(ADMISSIONS_TOTAL, "outcome" => outcome).increment(1);
}

pub fn record_queue_depth(depth: usize) {
    gauge!(QUEUE_DEPTH).set(depth as f64);
}

/// Time a dequeued item spent waiting for the worker.
pub fn record_queue_wait(wait_ms: u64) {
    histogram!(QUEUE_WAIT_MS).record(wait_ms as f64);
}

pub fn record_generation_success(latency_ms: u64) {
    counter!(GENERATIONS_TOTAL, "status" => "ok").increment(1);
    histogram!(GENERATION_LATENCY_MS).record(latency_ms as f64);
}

pub fn record_generation_failure(reason: &'static str) {
    counter!(GENERATIONS_TOTAL, "status" => "error", "reason" => reason).increment(1);
}
