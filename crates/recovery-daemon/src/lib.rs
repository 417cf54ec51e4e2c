//! Stateful orchestration layer: wires the pure primitives in
//! `recovery-core` behind locks, a clock, and structured logging, and
//! exposes the wire-message shapes a registration/status feed delivers.

pub mod controller;
pub mod messages;
pub mod reporter;

pub use controller::{Controller, RecoveryCommand};
pub use messages::{coerce_recovery_config, ExecutionCommand, RawRecoveryConfig, StatusCommand};
pub use reporter::{ComponentReport, RecoveryReport, RecoverySummary};
