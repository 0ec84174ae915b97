// Copyright 2026 genqueue Contributors
// SPDX-License-Identifier: Apache-2.0

//! `serve` subcommand: run the bot pipeline over line-oriented chat.
//!
//! Each input line is `submitter: message`. Generation commands are parsed,
//! submitted to the queue, and the admission message is written back as
//! `@submitter message`. `!queue` replies with the current depth and health.
//! A worker drains the queue into the generator.

use std::future::Future;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::command::{is_status_command, parse_generate_command, ChatLine};
use crate::scheduler::{spawn_worker, Generator};
use crate::shutdown::ShutdownResult;
use crate::Runtime;

/// Why the chat loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Input closed; the backlog was processed before stopping.
    EndOfInput,
    /// Interrupted; queued requests were abandoned.
    Interrupted,
}

/// What happened during one `serve` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeSummary {
    pub stop_reason: StopReason,
    pub accepted: usize,
    pub rejected: usize,
    /// Requests still queued when the worker stopped.
    pub abandoned: usize,
    pub shutdown: ShutdownResult,
}

/// Run the chat loop until `input` closes or `interrupt` resolves.
pub async fn run_serve<R, W, I>(
    runtime: &Runtime,
    generator: Arc<dyn Generator>,
    input: R,
    mut output: W,
    interrupt: I,
) -> std::io::Result<ServeSummary>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    I: Future<Output = ()>,
{
    let stop = CancellationToken::new();
    let mut worker = spawn_worker(
        Arc::clone(&runtime.queue),
        generator,
        runtime.worker_config.clone(),
        Arc::clone(&runtime.coordinator),
        stop.clone(),
    );

    let mut lines = input.lines();
    let mut accepted = 0;
    let mut rejected = 0;
    tokio::pin!(interrupt);

    let stop_reason = loop {
        let line = tokio::select! {
            () = &mut interrupt => break StopReason::Interrupted,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else { break StopReason::EndOfInput };
        let Some(chat) = ChatLine::parse(&line) else { continue };
        if is_status_command(chat.text) {
            let report = runtime.health_report();
            let reply = format!(
                "@{} Queue: {}/{} ({:?})\n",
                chat.submitter, report.queue_depth, report.max_size, report.state,
            );
            output.write_all(reply.as_bytes()).await?;
            continue;
        }
        let Some(prompt) = parse_generate_command(chat.text) else { continue };

        let result = runtime.submit(&prompt, chat.submitter);
        if result.accepted {
            accepted += 1;
        } else {
            rejected += 1;
        }
        let reply = match result.position {
            Some(position) => format!("@{} {} (position {})\n", chat.submitter, result.message, position),
            None => format!("@{} {}\n", chat.submitter, result.message),
        };
        output.write_all(reply.as_bytes()).await?;
    };
    output.flush().await?;

    let mut worker_exit = None;
    if stop_reason == StopReason::EndOfInput {
        worker_exit = drain_backlog(runtime, &mut worker).await;
    }

    stop.cancel();
    let shutdown = runtime.shutdown().await;
    let worker_exit = match worker_exit {
        Some(exit) => exit,
        None => {
            if let ShutdownResult::Timeout { remaining } = shutdown {
                tracing::warn!(remaining, "shutdown timed out; aborting worker");
                worker.abort();
            }
            worker.await
        }
    };
    match worker_exit {
        Err(e) if !e.is_cancelled() => tracing::error!(error = %e, "worker task failed"),
        _ => {}
    }

    let abandoned = runtime.queue.depth();
    if abandoned > 0 {
        tracing::warn!(abandoned, "queued requests abandoned at shutdown");
    }
    Ok(ServeSummary { stop_reason, accepted, rejected, abandoned, shutdown })
}

/// Wait for the worker to empty the queue. Returns the worker's exit if it
/// stopped first; whatever it left behind is abandoned.
async fn drain_backlog(
    runtime: &Runtime,
    worker: &mut JoinHandle<()>,
) -> Option<Result<(), JoinError>> {
    while !runtime.queue.is_empty() {
        tokio::select! {
            exit = &mut *worker => {
                tracing::error!(
                    remaining = runtime.queue.depth(),
                    "worker stopped before the backlog was processed"
                );
                return Some(exit);
            }
            () = tokio::time::sleep(runtime.worker_config.poll_interval) => {}
        }
    }
    None
}
