//! The recovery decision table: `(mode, desired, current, stale) ->
//! Option<CommandKind>`. A direct translation of the table into a
//! `match`, no dynamic dispatch.

use crate::types::{CommandKind, LifecycleState, RecoveryMode};

/// Decide what recovery action, if any, a component needs right now.
pub fn evaluate(
    mode: RecoveryMode,
    desired: LifecycleState,
    current: LifecycleState,
    stale: bool,
) -> Option<CommandKind> {
    use LifecycleState::*;
    use RecoveryMode::*;

    if !allowed(mode, desired, current) {
        return None;
    }

    match mode {
        Disabled => None,
        AutoStart => match (desired, current) {
            (Started, Installed) => Some(CommandKind::Start),
            _ if desired == current => None,
            _ => None,
        },
        Full => match (desired, current) {
            (Started, Installed) => Some(CommandKind::Start),
            (Started, Init) => Some(CommandKind::Install),
            (Installed, Init) => Some(CommandKind::Install),
            _ if desired == current && current == Installed && stale => Some(CommandKind::Install),
            _ if desired == current && current == Started && stale => Some(CommandKind::Restart),
            _ => None,
        },
    }
}

/// §4.E's admissibility guard: a mode only ever considers a fixed set of
/// desired/current states, independent of what the match arms above
/// would otherwise compute.
fn allowed(mode: RecoveryMode, desired: LifecycleState, current: LifecycleState) -> bool {
    use LifecycleState::*;
    use RecoveryMode::*;
    match mode {
        Disabled => false,
        AutoStart => desired == Started && current == Installed,
        Full => {
            matches!(desired, Started | Installed) && matches!(current, Init | Installed | Started)
        }
    }
}
