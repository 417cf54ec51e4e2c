mod cli;
mod feed;

use std::sync::Arc;

use clap::Parser;
use cli::{Cli, Command, RunOpts};
use feed::FeedEvent;
use recovery_core::SystemClock;
use recovery_daemon::Controller;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Command::Run(opts) => run(opts).await,
        Command::Report(opts) => report(opts).await,
    }
}

fn init_tracing() {
    let filter = std::env::var("RECOVERYD_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();
}

async fn build_controller(opts: &RunOpts) -> anyhow::Result<(Controller, Vec<FeedEvent>)> {
    let contents = tokio::fs::read_to_string(&opts.feed).await?;
    let events = feed::parse(&contents)?;
    let controller = Controller::new(Arc::new(SystemClock));
    Ok((controller, events))
}

/// Replay the feed, printing every recovery command emitted on a tick.
async fn run(opts: RunOpts) -> anyhow::Result<()> {
    let (controller, events) = build_controller(&opts).await?;
    for event in events {
        if let Some(commands) = apply(&controller, event) {
            for command in commands {
                println!("{}", serde_json::to_string(&serde_json::json!({
                    "component": command.component,
                    "taskId": command.task_id,
                    "body": command.body,
                }))?);
            }
        }
    }
    Ok(())
}

/// Replay the feed, printing only the final recovery report.
async fn report(opts: RunOpts) -> anyhow::Result<()> {
    let (controller, events) = build_controller(&opts).await?;
    for event in events {
        apply(&controller, event);
    }
    let report = controller.snapshot_report();
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Apply one feed event to the controller. Returns `Some` only for a
/// `Tick` event, carrying whatever commands that tick collected.
fn apply(controller: &Controller, event: FeedEvent) -> Option<Vec<recovery_daemon::RecoveryCommand>> {
    match event {
        FeedEvent::Registration { recovery_config } => {
            if let Err(err) = controller.configure_from_raw(&recovery_config) {
                tracing::warn!(error = %err, "registration rejected");
            }
            None
        }
        FeedEvent::StatusCommand(cmd) => {
            controller.ingest_status_commands(std::slice::from_ref(&cmd));
            None
        }
        FeedEvent::ExecutionCommand(cmd) => {
            controller.ingest_execution_commands(std::slice::from_ref(&cmd));
            None
        }
        FeedEvent::LiveStatus { component, current } => {
            controller.update_current(&component, current);
            None
        }
        FeedEvent::SetStale { component, stale } => {
            controller.update_stale(&component, stale);
            None
        }
        FeedEvent::Pause { paused } => {
            controller.set_paused(paused);
            None
        }
        FeedEvent::Tick => Some(controller.collect_commands()),
    }
}
