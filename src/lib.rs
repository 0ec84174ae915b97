//! genqueue
//!
//! Admission and ordering layer between chat commands and a slow,
//! capacity-constrained generation backend.
//!
//! - **Bounded**: a hard capacity protects the backend from overload
//! - **Fair**: a per-submitter cooldown stops one user from flooding it
//! - **Ordered**: accepted requests reach the worker strictly first-in-first-out
//!
//! The queue is plain synchronous bookkeeping behind one mutex. The worker
//! loop in [`scheduler::worker`] owns the only suspension point.

pub mod cli;
pub mod command;
pub mod config;
pub mod health;
pub mod scheduler;
pub mod shutdown;
pub mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use health::{HealthChecker, HealthReport};
use scheduler::{GenerationQueue, GenerationQueueConfig, QueueResult, WorkerConfig};
use shutdown::{ShutdownCoordinator, ShutdownResult};

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub queue: GenerationQueueConfig,
    pub worker: WorkerConfig,
    pub shutdown_timeout: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            queue: GenerationQueueConfig::default(),
            worker: WorkerConfig::default(),
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&config::EnvConfig> for RuntimeConfig {
    fn from(env: &config::EnvConfig) -> Self {
        Self {
            queue: env.queue.clone(),
            worker: env.worker.clone(),
            shutdown_timeout: env.shutdown_timeout,
        }
    }
}

/// Message returned to producers once shutdown has begun.
pub const SHUTTING_DOWN_MESSAGE: &str = "Bot is shutting down.";

/// A queue together with the components that share it.
pub struct Runtime {
    pub queue: Arc<GenerationQueue>,
    pub coordinator: Arc<ShutdownCoordinator>,
    pub health: HealthChecker,
    pub worker_config: WorkerConfig,
    pub shutdown_timeout: Duration,
}

impl Runtime {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            queue: Arc::new(GenerationQueue::new(config.queue)),
            coordinator: Arc::new(ShutdownCoordinator::new()),
            health: HealthChecker::new(),
            worker_config: config.worker,
            shutdown_timeout: config.shutdown_timeout,
        }
    }

    /// Producer entry point: refuse once draining, otherwise enqueue.
    pub fn submit(&self, prompt: &str, submitter: &str) -> QueueResult {
        self.coordinator
            .while_accepting(|| self.queue.enqueue(prompt, submitter))
            .unwrap_or_else(|| QueueResult {
                accepted: false,
                message: SHUTTING_DOWN_MESSAGE.to_string(),
                position: None,
                rejection: None,
            })
    }

    pub fn health_report(&self) -> HealthReport {
        self.health.report(&self.queue, self.coordinator.state())
    }

    /// Stop admitting and wait for in-flight generations.
    pub async fn shutdown(&self) -> ShutdownResult {
        self.coordinator.initiate(self.shutdown_timeout).await
    }
}
