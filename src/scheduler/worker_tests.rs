//! Tests for the worker poll-dispatch loop.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;

use super::*;
use crate::scheduler::GenerationQueueConfig;

/// Records prompts in the order they reach the backend.
#[derive(Default)]
struct RecordingGenerator {
    seen: Mutex<Vec<String>>,
    fail_on: Option<&'static str>,
}

#[async_trait]
impl Generator for RecordingGenerator {
    async fn generate(&self, item: &QueueItem) -> Result<Generation, GenerateError> {
        self.seen.lock().push(item.prompt.clone());
        if self.fail_on == Some(item.prompt.as_str()) {
            return Err(GenerateError::Failed("boom".into()));
        }
        Ok(Generation { clip: format!("{}.mp4", item.prompt) })
    }
}

/// Blocks inside `generate` until released.
struct GatedGenerator {
    started: Notify,
    release: Notify,
}

#[async_trait]
impl Generator for GatedGenerator {
    async fn generate(&self, _item: &QueueItem) -> Result<Generation, GenerateError> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(Generation { clip: "gated.mp4".into() })
    }
}

fn setup() -> (Arc<GenerationQueue>, Arc<ShutdownCoordinator>, CancellationToken) {
    let config = GenerationQueueConfig::new(16, 0.0).unwrap();
    (
        Arc::new(GenerationQueue::new(config)),
        Arc::new(ShutdownCoordinator::new()),
        CancellationToken::new(),
    )
}

fn fast() -> WorkerConfig {
    WorkerConfig { poll_interval: Duration::from_millis(5) }
}

async fn wait_for_seen(generator: &RecordingGenerator, n: usize) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while generator.seen.lock().len() < n {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("worker did not process requests in time");
}

#[tokio::test]
async fn worker_dispatches_in_fifo_order() {
    let (queue, coordinator, shutdown) = setup();
    queue.enqueue("first", "a");
    queue.enqueue("second", "b");
    queue.enqueue("third", "c");

    let generator = Arc::new(RecordingGenerator::default());
    let worker = spawn_worker(
        queue.clone(), generator.clone(), fast(), coordinator, shutdown.clone(),
    );

    wait_for_seen(&generator, 3).await;
    assert_eq!(*generator.seen.lock(), vec!["first", "second", "third"]);
    assert_eq!(queue.depth(), 0);

    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(1), worker).await.unwrap().unwrap();
}

#[tokio::test]
async fn worker_picks_up_items_enqueued_while_idle() {
    let (queue, coordinator, shutdown) = setup();
    let generator = Arc::new(RecordingGenerator::default());
    let worker = spawn_worker(
        queue.clone(), generator.clone(), fast(), coordinator, shutdown.clone(),
    );

    tokio::time::sleep(Duration::from_millis(20)).await;
    queue.enqueue("late", "a");

    wait_for_seen(&generator, 1).await;
    assert_eq!(*generator.seen.lock(), vec!["late"]);

    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(1), worker).await.unwrap().unwrap();
}

#[tokio::test]
async fn failed_generation_is_not_retried() {
    let (queue, coordinator, shutdown) = setup();
    queue.enqueue("bad", "a");
    queue.enqueue("good", "b");

    let generator = Arc::new(RecordingGenerator { fail_on: Some("bad"), ..Default::default() });
    let worker = spawn_worker(
        queue.clone(), generator.clone(), fast(), coordinator, shutdown.clone(),
    );

    wait_for_seen(&generator, 2).await;
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(*generator.seen.lock(), vec!["bad", "good"]);

    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(1), worker).await.unwrap().unwrap();
}

#[tokio::test]
async fn idle_worker_stops_on_cancel() {
    let (queue, coordinator, shutdown) = setup();
    let worker = spawn_worker(
        queue, Arc::new(RecordingGenerator::default()), fast(), coordinator, shutdown.clone(),
    );

    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(1), worker)
        .await
        .expect("worker should exit promptly when idle")
        .unwrap();
}

#[tokio::test]
async fn generation_counts_as_in_flight() {
    let (queue, coordinator, shutdown) = setup();
    queue.enqueue("slow", "a");

    let generator = Arc::new(GatedGenerator { started: Notify::new(), release: Notify::new() });
    let worker = spawn_worker(
        queue, generator.clone(), fast(), coordinator.clone(), shutdown.clone(),
    );

    tokio::time::timeout(Duration::from_secs(1), generator.started.notified())
        .await
        .unwrap();
    assert_eq!(coordinator.in_flight_count(), 1);

    // Cancelling mid-generation lets the current request finish.
    shutdown.cancel();
    generator.release.notify_one();
    tokio::time::timeout(Duration::from_secs(1), worker).await.unwrap().unwrap();
    assert_eq!(coordinator.in_flight_count(), 0);
}

#[tokio::test]
async fn simulated_generator_names_clip_after_request() {
    let queue = GenerationQueue::default();
    queue.enqueue("fire sword girl", "alice");
    let item = queue.dequeue().unwrap();

    let generator = SimulatedGenerator::new(Duration::from_millis(1));
    let generation = generator.generate(&item).await.unwrap();
    assert_eq!(generation.clip, format!("clips/{}.mp4", item.request_id));
}
