//! Pure, synchronous recovery-decision primitives: admission control,
//! component status tracking, command template caching and the recovery
//! policy table. Nothing in this crate performs I/O or logging — every
//! public function is a deterministic function of its explicit inputs,
//! so the orchestration layer (recovery-daemon) can be the only place
//! that owns locks, clocks and tracing.

pub mod clock;
pub mod command_cache;
pub mod config;
pub mod error;
pub mod policy;
pub mod rate_limiter;
pub mod status_store;
pub mod types;

pub use clock::{Clock, SystemClock};
#[cfg(any(test, feature = "test-support"))]
pub use clock::testing::FakeClock;
pub use command_cache::{CommandCache, COMMAND_REFRESH_DELAY_SEC};
pub use config::RecoveryConfig;
pub use error::ConfigError;
pub use rate_limiter::{ActionCounter, AdmitOutcome, RateLimiter};
pub use status_store::{ComponentStatus, StatusStore};
pub use types::{CommandKind, LifecycleState, PayloadLevel, RecoveryMode};
