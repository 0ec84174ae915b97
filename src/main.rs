//! genqueue entry point.
//!
//! ## CLI Subcommands
//!
//! - `genqueue` or `genqueue serve` - Run the chat pipeline over stdin (default)
//! - `genqueue config show|defaults|validate` - Inspect configuration
//! - `genqueue version` / `genqueue help`

use std::process::ExitCode;
use std::sync::Arc;

use genqueue::cli::{config_cmd, run_serve, StopReason};
use genqueue::config;
use genqueue::scheduler::SimulatedGenerator;
use genqueue::shutdown::ShutdownResult;
use genqueue::telemetry;
use genqueue::{Runtime, RuntimeConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("serve");

    match command {
        "serve" | "" => serve().await,
        "config" => {
            let subcommand = args.get(2).map(|s| s.as_str()).unwrap_or("show");
            match subcommand {
                "show" => {
                    let json = args.get(3).map(|s| s.as_str()) == Some("--json");
                    config_cmd::run_show(json);
                    ExitCode::SUCCESS
                }
                "defaults" => {
                    config_cmd::run_defaults();
                    ExitCode::SUCCESS
                }
                "validate" => ExitCode::from(config_cmd::run_validate() as u8),
                _ => {
                    eprintln!("Unknown config subcommand: {}", subcommand);
                    print_command_help("config");
                    ExitCode::FAILURE
                }
            }
        }
        "help" | "--help" | "-h" => {
            match args.get(2) {
                Some(subcommand) => print_command_help(subcommand),
                None => print_usage(),
            }
            ExitCode::SUCCESS
        }
        "version" | "--version" | "-V" => {
            println!("genqueue {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            ExitCode::FAILURE
        }
    }
}

async fn serve() -> ExitCode {
    let env = config::load();
    if let Err(e) = telemetry::init_logging(&env.log) {
        eprintln!("Logging setup failed: {}", e);
        return ExitCode::from(2u8);
    }

    let runtime = Runtime::new(RuntimeConfig::from(&env));
    let generator = Arc::new(SimulatedGenerator::new(env.generation_delay));
    tracing::info!(
        max_size = runtime.queue.max_size(),
        cooldown_secs = runtime.queue.cooldown().as_secs_f64(),
        "genqueue serving chat from stdin"
    );

    let input = tokio::io::BufReader::new(tokio::io::stdin());
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    match run_serve(&runtime, generator, input, tokio::io::stdout(), interrupt).await {
        Ok(summary) => {
            let report = runtime.health_report();
            tracing::info!(
                accepted = summary.accepted,
                rejected = summary.rejected,
                abandoned = summary.abandoned,
                interrupted = summary.stop_reason == StopReason::Interrupted,
                health = %serde_json::to_string(&report).unwrap_or_default(),
                "genqueue stopped"
            );
            match summary.shutdown {
                ShutdownResult::Complete => ExitCode::SUCCESS,
                ShutdownResult::Timeout { remaining } => {
                    eprintln!("Shutdown timed out with {} generation(s) in flight", remaining);
                    ExitCode::FAILURE
                }
            }
        }
        Err(e) => {
            eprintln!("I/O error: {}", e);
            ExitCode::from(3u8)
        }
    }
}

fn print_usage() {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        "genqueue - generation request queue v{}

USAGE:
    genqueue [COMMAND] [OPTIONS]

COMMANDS:
    serve        Read chat lines from stdin and queue generations (default)
    config       Manage configuration (show, defaults, validate)
    version      Show version information
    help         Show this help message

CHAT INPUT:
    alice: !anime \"fire sword girl\"   # Queue a generation
    bob: !anime robot cat doing ballet # Bare prompts work too
    carol: !queue                      # Show queue depth and health

ENVIRONMENT:
    GENQUEUE_MAX_SIZE              Max pending requests (default: 10)
    GENQUEUE_COOLDOWN_SECS         Per-user cooldown (default: 30)
    GENQUEUE_POLL_INTERVAL_MS      Worker idle backoff (default: 500)
    GENQUEUE_SHUTDOWN_TIMEOUT      Drain timeout in seconds (default: 30)
    GENQUEUE_GENERATION_DELAY_MS   Simulated generation time (default: 2000)
    GENQUEUE_LOG_FORMAT            pretty or json (default: pretty)
    GENQUEUE_LOG_FILE              Log file path (default: stderr)
    RUST_LOG                       Log filter (default: info)

EXIT CODES:
    0  Success
    1  Failure / shutdown timed out / config warnings
    2  Logging setup failed
    3  I/O error",
        version
    );
}

fn print_command_help(command: &str) {
    match command {
        "serve" => {
            eprintln!(
                "genqueue serve - Run the chat pipeline

USAGE:
    genqueue serve

DESCRIPTION:
    Reads `submitter: message` lines from stdin. `!anime` commands are
    admitted to the queue (cooldown first, then capacity) and the result
    is written to stdout. A worker hands queued requests to the simulated
    generator in FIFO order.

    On end of input the backlog is processed before exiting. On Ctrl-C
    the queue stops admitting, in-flight generations finish, and queued
    requests are abandoned."
            );
        }
        "config" => {
            eprintln!(
                "genqueue config - Manage configuration

USAGE:
    genqueue config [SUBCOMMAND]

SUBCOMMANDS:
    show [--json]  Show effective configuration (default)
    defaults       Show default values
    validate       Check configuration (exit 1 on warnings)"
            );
        }
        _ => {
            eprintln!("No help available for '{}'", command);
            print_usage();
        }
    }
}
