//! Single worker loop: poll the queue and hand requests to a generator.
//!
//! The queue never blocks, so the loop owns the only suspension point: an
//! idle backoff between empty polls. Each dequeued request is handed to the
//! generator exactly once; failures are logged and dropped, never retried.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::item::QueueItem;
use super::queue::GenerationQueue;
use crate::shutdown::ShutdownCoordinator;
use crate::telemetry::{self, GenerationSpan, SpanExt};

/// Finished output for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    /// Location of the produced clip, as reported by the backend.
    pub clip: String,
}

/// Failure reported by a generation backend.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("generation backend unavailable: {0}")]
    Unavailable(String),
    #[error("generation timed out after {0:?}")]
    Timeout(Duration),
    #[error("generation failed: {0}")]
    Failed(String),
}

impl GenerateError {
    fn label(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "unavailable",
            Self::Timeout(_) => "timeout",
            Self::Failed(_) => "failed",
        }
    }
}

/// Downstream generation backend.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, item: &QueueItem) -> Result<Generation, GenerateError>;
}

/// Stand-in backend that waits a fixed delay and names the clip after the
/// request id.
#[derive(Debug, Clone)]
pub struct SimulatedGenerator {
    delay: Duration,
}

impl SimulatedGenerator {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Generator for SimulatedGenerator {
    async fn generate(&self, item: &QueueItem) -> Result<Generation, GenerateError> {
        tokio::time::sleep(self.delay).await;
        Ok(Generation { clip: format!("clips/{}.mp4", item.request_id) })
    }
}

/// Worker loop settings.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Wait between polls when the queue is empty.
    pub poll_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self { poll_interval: Duration::from_millis(500) }
    }
}

/// Spawn the worker loop. Cancel `shutdown` to stop it after the current
/// generation finishes.
pub fn spawn_worker(
    queue: Arc<GenerationQueue>,
    generator: Arc<dyn Generator>,
    config: WorkerConfig,
    coordinator: Arc<ShutdownCoordinator>,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        worker_loop(&queue, generator.as_ref(), &config, &coordinator, shutdown).await;
    })
}

async fn worker_loop(
    queue: &GenerationQueue,
    generator: &dyn Generator,
    config: &WorkerConfig,
    coordinator: &ShutdownCoordinator,
    shutdown: CancellationToken,
) {
    tracing::info!(poll_interval_ms = config.poll_interval.as_millis() as u64, "worker started");
    loop {
        if shutdown.is_cancelled() {
            break;
        }
        // Hold the guard across the dequeue so an item is never outside the
        // queue without being counted as in flight.
        let Some(guard) = coordinator.track() else { break };
        let item = match queue.dequeue() {
            Some(item) => item,
            None => {
                drop(guard);
                tokio::select! {
                    biased;
                    () = shutdown.cancelled() => break,
                    () = tokio::time::sleep(config.poll_interval) => {}
                }
                continue;
            }
        };
        execute(generator, item).await;
        drop(guard);
    }
    tracing::info!("worker: shutdown signal received");
}

async fn execute(generator: &dyn Generator, item: QueueItem) {
    let wait_ms = item.waited().as_millis() as u64;
    telemetry::record_queue_wait(wait_ms);

    let span = GenerationSpan::new(&item.request_id.to_string(), &item.submitter, wait_ms);
    let start = Instant::now();
    let result = generator.generate(&item).instrument(span.clone()).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    span.record("latency_ms", latency_ms);
    span.record_result(&result);
    let _enter = span.enter();
    match result {
        Ok(generation) => {
            telemetry::record_generation_success(latency_ms);
            tracing::info!(clip = %generation.clip, latency_ms, "generation complete");
        }
        Err(e) => {
            telemetry::record_generation_failure(e.label());
            tracing::warn!(error = %e, "generation failed; request dropped");
        }
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
