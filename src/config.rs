//! Runtime configuration loading from environment variables.
//!
//! All values come from `GENQUEUE_*` variables with sensible defaults.
//! Invalid values fall back to defaults without crashing.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `GENQUEUE_MAX_SIZE` | 10 | Max pending generation requests |
//! | `GENQUEUE_COOLDOWN_SECS` | 30.0 | Per-submitter cooldown (0 disables) |
//! | `GENQUEUE_POLL_INTERVAL_MS` | 500 | Worker idle backoff |
//! | `GENQUEUE_SHUTDOWN_TIMEOUT` | 30 | Drain timeout (secs, 1 to 86400) |
//! | `GENQUEUE_GENERATION_DELAY_MS` | 2000 | Simulated generation time |
//! | `GENQUEUE_LOG_FORMAT` | pretty | `pretty` or `json` |
//! | `GENQUEUE_LOG_FILE` | unset | Log to this file instead of stderr |
//! | `RUST_LOG` | info | Log filter |

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::scheduler::{GenerationQueueConfig, WorkerConfig};
use crate::telemetry::{LogConfig, LogFormat};

pub const DEFAULT_MAX_SIZE: usize = 10;
pub const DEFAULT_COOLDOWN_SECS: f64 = 30.0;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_GENERATION_DELAY_MS: u64 = 2000;

const MIN_POLL_INTERVAL_MS: u64 = 10;
const MAX_SHUTDOWN_TIMEOUT_SECS: u64 = 86_400;

/// Effective configuration summary.
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub max_size: usize,
    pub cooldown_secs: f64,
    pub poll_interval_ms: u64,
    pub shutdown_timeout_secs: u64,
    pub generation_delay_ms: u64,
    pub log_format: &'static str,
    pub log_level: String,
}

/// All configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub queue: GenerationQueueConfig,
    pub worker: WorkerConfig,
    pub shutdown_timeout: Duration,
    pub generation_delay: Duration,
    pub log: LogConfig,
}

/// Parse a `usize` env var, returning `default` on missing or invalid.
fn parse_usize(key: &str, default: usize) -> usize {
    match std::env::var(key) {
        Ok(val) => val.trim().parse::<usize>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Parse a `u64` env var, returning `default` on missing or invalid.
fn parse_u64(key: &str, default: u64) -> u64 {
    match std::env::var(key) {
        Ok(val) => val.trim().parse::<u64>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Parse a non-negative, finite `f64` env var.
fn parse_secs(key: &str, default: f64) -> f64 {
    match std::env::var(key) {
        Ok(val) => match val.trim().parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => v,
            _ => default,
        },
        Err(_) => default,
    }
}

fn load_queue_config() -> GenerationQueueConfig {
    let max_size = parse_usize("GENQUEUE_MAX_SIZE", DEFAULT_MAX_SIZE).max(1);
    let cooldown = parse_secs("GENQUEUE_COOLDOWN_SECS", DEFAULT_COOLDOWN_SECS);
    // A cooldown too large for a Duration is rejected here.
    GenerationQueueConfig::new(max_size, cooldown)
        .or_else(|_| GenerationQueueConfig::new(max_size, DEFAULT_COOLDOWN_SECS))
        .unwrap_or_default()
}

fn load_worker_config() -> WorkerConfig {
    let poll_ms = parse_u64("GENQUEUE_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS)
        .max(MIN_POLL_INTERVAL_MS);
    WorkerConfig { poll_interval: Duration::from_millis(poll_ms) }
}

fn load_log_config() -> LogConfig {
    let format = std::env::var("GENQUEUE_LOG_FORMAT")
        .ok()
        .and_then(|v| v.parse::<LogFormat>().ok())
        .unwrap_or_default();
    let level = std::env::var("RUST_LOG")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| "info".to_string());
    let output_path = std::env::var("GENQUEUE_LOG_FILE")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from);
    LogConfig { format, level, output_path }
}

/// Load all configuration from environment variables.
pub fn load() -> EnvConfig {
    let shutdown_secs = parse_u64("GENQUEUE_SHUTDOWN_TIMEOUT", DEFAULT_SHUTDOWN_TIMEOUT_SECS)
        .clamp(1, MAX_SHUTDOWN_TIMEOUT_SECS);
    let delay_ms = parse_u64("GENQUEUE_GENERATION_DELAY_MS", DEFAULT_GENERATION_DELAY_MS);

    EnvConfig {
        queue: load_queue_config(),
        worker: load_worker_config(),
        shutdown_timeout: Duration::from_secs(shutdown_secs),
        generation_delay: Duration::from_millis(delay_ms),
        log: load_log_config(),
    }
}

impl EnvConfig {
    pub fn effective_config(&self) -> EffectiveConfig {
        EffectiveConfig {
            max_size: self.queue.max_size(),
            cooldown_secs: self.queue.cooldown().as_secs_f64(),
            poll_interval_ms: self.worker.poll_interval.as_millis() as u64,
            shutdown_timeout_secs: self.shutdown_timeout.as_secs(),
            generation_delay_ms: self.generation_delay.as_millis() as u64,
            log_format: self.log.format.as_str(),
            log_level: self.log.level.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    // Serialize env-mutating tests to avoid cross-test pollution.
    pub(crate) static ENV_LOCK: Mutex<()> = Mutex::new(());

    pub(crate) const ENV_KEYS: &[&str] = &[
        "GENQUEUE_MAX_SIZE",
        "GENQUEUE_COOLDOWN_SECS",
        "GENQUEUE_POLL_INTERVAL_MS",
        "GENQUEUE_SHUTDOWN_TIMEOUT",
        "GENQUEUE_GENERATION_DELAY_MS",
        "GENQUEUE_LOG_FORMAT",
        "GENQUEUE_LOG_FILE",
        "RUST_LOG",
    ];

    pub(crate) fn clear_env_vars() {
        for k in ENV_KEYS {
            std::env::remove_var(k);
        }
    }

    #[test]
    fn test_defaults_are_sensible() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        let cfg = load();
        assert_eq!(cfg.queue.max_size(), 10);
        assert_eq!(cfg.queue.cooldown(), Duration::from_secs(30));
        assert_eq!(cfg.worker.poll_interval, Duration::from_millis(500));
        assert_eq!(cfg.shutdown_timeout.as_secs(), 30);
        assert_eq!(cfg.generation_delay, Duration::from_millis(2000));
        assert_eq!(cfg.log.format, LogFormat::Pretty);
        assert_eq!(cfg.log.level, "info");
        assert!(cfg.log.output_path.is_none());
    }

    #[test]
    fn test_env_vars_override_defaults() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        std::env::set_var("GENQUEUE_MAX_SIZE", "25");
        std::env::set_var("GENQUEUE_COOLDOWN_SECS", "2.5");
        std::env::set_var("GENQUEUE_POLL_INTERVAL_MS", "250");
        std::env::set_var("GENQUEUE_LOG_FORMAT", "json");
        std::env::set_var("RUST_LOG", "genqueue=debug");
        let cfg = load();
        assert_eq!(cfg.queue.max_size(), 25);
        assert_eq!(cfg.queue.cooldown(), Duration::from_millis(2500));
        assert_eq!(cfg.worker.poll_interval, Duration::from_millis(250));
        assert_eq!(cfg.log.format, LogFormat::Json);
        assert_eq!(cfg.log.level, "genqueue=debug");
        clear_env_vars();
    }

    #[test]
    fn test_zero_cooldown_is_allowed() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        std::env::set_var("GENQUEUE_COOLDOWN_SECS", "0");
        assert_eq!(load().queue.cooldown(), Duration::ZERO);
        clear_env_vars();
    }

    #[test]
    fn test_invalid_env_falls_back_to_default() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        std::env::set_var("GENQUEUE_MAX_SIZE", "lots");
        std::env::set_var("GENQUEUE_COOLDOWN_SECS", "-4");
        std::env::set_var("GENQUEUE_LOG_FORMAT", "xml");
        let cfg = load();
        assert_eq!(cfg.queue.max_size(), 10);
        assert_eq!(cfg.queue.cooldown(), Duration::from_secs(30));
        assert_eq!(cfg.log.format, LogFormat::Pretty);

        std::env::set_var("GENQUEUE_COOLDOWN_SECS", "NaN");
        assert_eq!(load().queue.cooldown(), Duration::from_secs(30));
        clear_env_vars();
    }

    #[test]
    fn test_huge_cooldown_falls_back_to_default() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        std::env::set_var("GENQUEUE_MAX_SIZE", "4");
        std::env::set_var("GENQUEUE_COOLDOWN_SECS", "1e20");
        let cfg = load();
        assert_eq!(cfg.queue.cooldown(), Duration::from_secs(30));
        assert_eq!(cfg.queue.max_size(), 4);
        clear_env_vars();
    }

    #[test]
    fn test_shutdown_timeout_is_capped() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        std::env::set_var("GENQUEUE_SHUTDOWN_TIMEOUT", "18446744073709551615");
        assert_eq!(load().shutdown_timeout.as_secs(), MAX_SHUTDOWN_TIMEOUT_SECS);
        clear_env_vars();
    }

    #[test]
    fn test_floors_are_applied() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        std::env::set_var("GENQUEUE_MAX_SIZE", "0");
        std::env::set_var("GENQUEUE_POLL_INTERVAL_MS", "0");
        std::env::set_var("GENQUEUE_SHUTDOWN_TIMEOUT", "0");
        let cfg = load();
        assert_eq!(cfg.queue.max_size(), 1);
        assert_eq!(cfg.worker.poll_interval, Duration::from_millis(MIN_POLL_INTERVAL_MS));
        assert_eq!(cfg.shutdown_timeout.as_secs(), 1);
        clear_env_vars();
    }

    #[test]
    fn test_effective_config_reflects_loaded_values() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        std::env::set_var("GENQUEUE_COOLDOWN_SECS", "0.5");
        let eff = load().effective_config();
        assert_eq!(eff.max_size, 10);
        assert!((eff.cooldown_secs - 0.5).abs() < 1e-9);
        assert_eq!(eff.log_format, "pretty");
        clear_env_vars();
    }
}
