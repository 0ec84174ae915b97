//! Telemetry: structured logging, request spans, and metrics.

mod logging;
mod metrics;
mod spans;

pub use logging::{init_logging, LogConfig, LogError, LogFormat};
pub use self::metrics::{
    record_admission, record_generation_failure, record_generation_success,
    record_queue_depth, record_queue_wait, ADMISSIONS_TOTAL, GENERATIONS_TOTAL,
    GENERATION_LATENCY_MS, QUEUE_DEPTH, QUEUE_WAIT_MS,
};
pub use spans::{GenerationSpan, SpanExt};
