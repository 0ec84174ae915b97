// Copyright 2026 genqueue Contributors
// SPDX-License-Identifier: Apache-2.0

//! Config CLI subcommands: show, defaults, validate.

use tracing_subscriber::EnvFilter;

use crate::config::{self, EffectiveConfig, EnvConfig};

/// Print the effective config as key-value pairs, or JSON.
pub fn run_show(json: bool) {
    let cfg = config::load().effective_config();
    if json {
        match serde_json::to_string_pretty(&cfg) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("failed to serialize config: {e}"),
        }
    } else {
        print_config(&cfg);
    }
}

/// Print the documented defaults.
pub fn run_defaults() {
    println!("GENQUEUE_MAX_SIZE={}", config::DEFAULT_MAX_SIZE);
    println!("GENQUEUE_COOLDOWN_SECS={}", config::DEFAULT_COOLDOWN_SECS);
    println!("GENQUEUE_POLL_INTERVAL_MS={}", config::DEFAULT_POLL_INTERVAL_MS);
    println!("GENQUEUE_SHUTDOWN_TIMEOUT={}", config::DEFAULT_SHUTDOWN_TIMEOUT_SECS);
    println!("GENQUEUE_GENERATION_DELAY_MS={}", config::DEFAULT_GENERATION_DELAY_MS);
    println!("GENQUEUE_LOG_FORMAT=pretty");
    println!("RUST_LOG=info");
}

/// Validate configuration. Returns 0 if valid, 1 if any warnings are found.
pub fn run_validate() -> i32 {
    let warnings = validate(&config::load());
    for w in &warnings {
        eprintln!("WARNING: {w}");
    }
    if warnings.is_empty() {
        println!("Configuration is valid.");
        0
    } else {
        1
    }
}

/// Collect misconfiguration warnings.
pub fn validate(env: &EnvConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if env.queue.cooldown().is_zero() {
        warnings.push("GENQUEUE_COOLDOWN_SECS is 0; per-user rate limiting is disabled".to_string());
    }
    if let Err(e) = EnvFilter::try_new(&env.log.level) {
        warnings.push(format!("RUST_LOG '{}' is not a valid filter: {e}", env.log.level));
    }
    if let Some(parent) = env.log.output_path.as_ref().and_then(|p| p.parent()) {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            warnings.push(format!(
                "GENQUEUE_LOG_FILE directory {} does not exist",
                parent.display()
            ));
        }
    }
    warnings
}

fn print_config(cfg: &EffectiveConfig) {
    println!("GENQUEUE_MAX_SIZE={}", cfg.max_size);
    println!("GENQUEUE_COOLDOWN_SECS={}", cfg.cooldown_secs);
    println!("GENQUEUE_POLL_INTERVAL_MS={}", cfg.poll_interval_ms);
    println!("GENQUEUE_SHUTDOWN_TIMEOUT={}", cfg.shutdown_timeout_secs);
    println!("GENQUEUE_GENERATION_DELAY_MS={}", cfg.generation_delay_ms);
    println!("GENQUEUE_LOG_FORMAT={}", cfg.log_format);
    println!("RUST_LOG={}", cfg.log_level);
}
