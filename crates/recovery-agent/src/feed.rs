//! A line-delimited JSON event feed used to drive the controller without
//! a live registration server, status probe or dispatcher. One event
//! per line; unrecognized trailing fields are rejected by serde rather
//! than silently ignored, since this is a test/demo harness rather than
//! a tolerant wire format.

use recovery_core::LifecycleState;
use recovery_daemon::{ExecutionCommand, RawRecoveryConfig, StatusCommand};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedEvent {
    Registration {
        #[serde(rename = "recoveryConfig")]
        recovery_config: RawRecoveryConfig,
    },
    StatusCommand(StatusCommand),
    ExecutionCommand(ExecutionCommand),
    LiveStatus {
        component: String,
        current: LifecycleState,
    },
    SetStale {
        component: String,
        stale: bool,
    },
    Pause {
        paused: bool,
    },
    Tick,
}

/// Parse a feed file's contents into an ordered list of events, skipping
/// blank lines.
pub fn parse(contents: &str) -> anyhow::Result<Vec<FeedEvent>> {
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(anyhow::Error::from))
        .collect()
}
