use serde::{Deserialize, Serialize};

/// Observed or desired lifecycle state of a managed component.
///
/// `Unreported` stands in for the empty string the wire format uses to
/// mean "never reported" / "unknown"; it is not a state a component can
/// be *driven to*, only one it can start in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LifecycleState {
    Unreported,
    Init,
    Installed,
    Started,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Unreported => "",
            LifecycleState::Init => "INIT",
            LifecycleState::Installed => "INSTALLED",
            LifecycleState::Started => "STARTED",
        }
    }
}

/// Recovery operating mode, as carried by the registration response's
/// `recoveryConfig.type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecoveryMode {
    Disabled,
    AutoStart,
    Full,
}

impl RecoveryMode {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, RecoveryMode::Disabled)
    }
}

/// The kind of recovery action [`crate::policy`] selects for a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Install,
    Start,
    Restart,
}

impl CommandKind {
    /// The `roleCommand` value a built recovery command carries.
    pub fn role_command(&self) -> &'static str {
        match self {
            CommandKind::Install => "INSTALL",
            CommandKind::Start => "START",
            CommandKind::Restart => "CUSTOM_COMMAND",
        }
    }
}

/// How much of a status command's payload was populated by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayloadLevel {
    Default,
    Minimal,
    ExecutionCommand,
}
