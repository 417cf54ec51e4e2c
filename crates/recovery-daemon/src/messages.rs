//! Wire-format message shapes and lenient parsing.
//!
//! Parsing the registration response's `recoveryConfig` object is kept
//! separate from `RecoveryConfig::validate`: this step always succeeds,
//! falling back to documented defaults for missing or non-integer
//! fields, while validation is the one place that can fail. Conflating
//! the two would make "missing field uses default" and "retryGap must be
//! below window" impossible to test independently.

use recovery_core::config::RecoveryConfig;
use recovery_core::types::{LifecycleState, PayloadLevel, RecoveryMode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw shape of `recoveryConfig` as delivered by the registration
/// response. Numeric fields are intentionally typed as `Option<Value>`
/// rather than `Option<u32>` so a string, a float, or a malformed value
/// can be told apart from "absent" and coerced the same lenient way the
/// original agent's integer parsing helper does.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RawRecoveryConfig {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(rename = "maxCount")]
    pub max_count: Option<Value>,
    #[serde(rename = "windowInMinutes")]
    pub window_in_minutes: Option<Value>,
    #[serde(rename = "retryGap")]
    pub retry_gap: Option<Value>,
    #[serde(rename = "maxLifetimeCount")]
    pub max_lifetime_count: Option<Value>,
}

/// Falls back to `default` when `value` is absent or is not an integer
/// JSON number (strings, floats, bools, null, objects, arrays all fall
/// back, mirroring a try/except-ValueError coercion).
fn read_u32(value: &Option<Value>, default: u32) -> u32 {
    value
        .as_ref()
        .and_then(Value::as_i64)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(default)
}

fn read_mode(kind: &Option<String>) -> RecoveryMode {
    match kind.as_deref() {
        Some("AUTO_START") => RecoveryMode::AutoStart,
        Some("FULL") => RecoveryMode::Full,
        _ => RecoveryMode::Disabled,
    }
}

/// Coerce a raw, loosely-typed `recoveryConfig` payload into a field set
/// ready for [`RecoveryConfig::validate`]. Never fails.
pub fn coerce_recovery_config(raw: &RawRecoveryConfig) -> (RecoveryMode, u32, u32, u32, u32) {
    (
        read_mode(&raw.kind),
        read_u32(&raw.max_count, RecoveryConfig::DEFAULT_MAX_COUNT),
        read_u32(&raw.window_in_minutes, RecoveryConfig::DEFAULT_WINDOW_IN_MIN),
        read_u32(&raw.retry_gap, RecoveryConfig::DEFAULT_RETRY_GAP),
        read_u32(&raw.max_lifetime_count, RecoveryConfig::DEFAULT_MAX_LIFETIME_COUNT),
    )
}

/// A status command as delivered by the server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatusCommand {
    #[serde(rename = "componentName")]
    pub component_name: String,
    #[serde(rename = "desiredState")]
    pub desired_state: LifecycleState,
    #[serde(rename = "hasStaleConfigs", default)]
    pub has_stale_configs: bool,
    #[serde(rename = "payloadLevel")]
    pub payload_level: PayloadLevel,
    #[serde(rename = "executionCommandDetails")]
    pub execution_command_details: Option<Value>,
}

/// An execution command, consumed only for desired-state tracking.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExecutionCommand {
    pub role: String,
    #[serde(rename = "roleCommand")]
    pub role_command: String,
}
