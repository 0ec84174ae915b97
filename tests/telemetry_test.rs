//! Logging initialization and structured output.

use genqueue::scheduler::GenerationQueue;
use genqueue::telemetry::{init_logging, LogConfig, LogError, LogFormat};

#[test]
fn json_logs_go_to_file_and_init_happens_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("genqueue.log");
    let config = LogConfig {
        format: LogFormat::Json,
        level: "genqueue=debug".to_string(),
        output_path: Some(path.clone()),
    };

    init_logging(&config).unwrap();

    let queue = GenerationQueue::default();
    queue.enqueue("fire sword girl", "alice");
    queue.enqueue("again", "alice");

    let contents = std::fs::read_to_string(&path).unwrap();
    let events: Vec<serde_json::Value> = contents
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert!(events.iter().any(|e| e["fields"]["message"] == "generation request accepted"));
    assert!(events
        .iter()
        .any(|e| e["fields"]["reason"] == "rate_limited" && e["fields"]["submitter"] == "alice"));

    let again = init_logging(&LogConfig::default());
    assert!(matches!(again, Err(LogError::AlreadyInitialized)));
}
