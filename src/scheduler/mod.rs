//! Request scheduling: admission control, FIFO ordering, and the worker
//! loop that drains the queue into a generation backend.

mod admission;
mod cooldown;
mod item;
mod queue;
pub mod worker;

pub use admission::{QueueResult, RateLimitResult, Rejection, ACCEPTED_MESSAGE};
pub use item::QueueItem;
pub use queue::{ConfigError, GenerationQueue, GenerationQueueConfig};
pub use worker::{
    spawn_worker, GenerateError, Generation, Generator, SimulatedGenerator, WorkerConfig,
};
