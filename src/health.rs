//! Health reporting for notifiers and operators.
//!
//! Combines the queue's occupancy signals with the shutdown state. The
//! queue counts as degraded only when it is at capacity.

use std::time::Instant;

use serde::Serialize;

use crate::scheduler::GenerationQueue;
use crate::shutdown::ShutdownState;

/// Overall health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Point-in-time health report.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub state: HealthState,
    pub accepting_requests: bool,
    pub queue_depth: usize,
    pub max_size: usize,
    pub tracked_submitters: usize,
    pub uptime_secs: u64,
}

pub struct HealthChecker {
    start_time: Instant,
}

impl HealthChecker {
    pub fn new() -> Self {
        Self { start_time: Instant::now() }
    }

    /// Check readiness: running and able to take at least one more request.
    pub fn is_ready(&self, queue: &GenerationQueue, shutdown_state: ShutdownState) -> bool {
        shutdown_state == ShutdownState::Running && !queue.is_full()
    }

    pub fn report(&self, queue: &GenerationQueue, shutdown_state: ShutdownState) -> HealthReport {
        HealthReport {
            state: Self::compute_state(queue, shutdown_state),
            accepting_requests: shutdown_state == ShutdownState::Running,
            queue_depth: queue.depth(),
            max_size: queue.max_size(),
            tracked_submitters: queue.tracked_submitters(),
            uptime_secs: self.start_time.elapsed().as_secs(),
        }
    }

    fn compute_state(queue: &GenerationQueue, shutdown_state: ShutdownState) -> HealthState {
        if shutdown_state != ShutdownState::Running {
            return HealthState::Unhealthy;
        }
        if queue.health_degraded() {
            return HealthState::Degraded;
        }
        HealthState::Healthy
    }
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new()
    }
}
