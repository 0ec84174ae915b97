//! Span utilities for generation requests.

use tracing::{info_span, Span};

/// Extension trait for recording an operation's outcome into a span.
pub trait SpanExt {
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display;
}

impl SpanExt for Span {
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display,
    {
        match result {
            Ok(_) => {
                self.record("status", "ok");
            }
            Err(e) => {
                self.record("status", "error");
                self.record("error.message", e.to_string().as_str());
            }
        }
    }
}

/// Factory for generation spans.
pub struct GenerationSpan;

impl GenerationSpan {
    /// Span covering one dequeued request from dispatch to completion.
    ///
    /// `status`, `error.message` and `latency_ms` start empty and are filled
    /// in by the worker.
    pub fn new(request_id: &str, submitter: &str, wait_ms: u64) -> Span {
        info_span!(
            "generation",
            request_id = %request_id,
            submitter = %submitter,
            wait_ms,
            status = tracing::field::Empty,
            error.message = tracing::field::Empty,
            latency_ms = tracing::field::Empty,
        )
    }
}
