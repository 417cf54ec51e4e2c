//! Orchestrates the pure primitives in `recovery-core` behind the
//! locking scheme described for this subsystem: one coarse lock over
//! status/rate-limit/cache/config state (mutations are infrequent and
//! co-locating them avoids ordering hazards between a setter-induced
//! cache purge and a concurrent command build), and a lock-free counter
//! for the advisory active-command count.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use recovery_core::{
    Clock, CommandCache, CommandKind, ComponentStatus, ConfigError, LifecycleState, PayloadLevel,
    RateLimiter, RecoveryConfig, RecoveryMode, StatusStore,
};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::messages::{coerce_recovery_config, ExecutionCommand, RawRecoveryConfig, StatusCommand};
use crate::reporter::{summarize, ComponentSnapshot, RecoveryReport};

/// A recovery command ready for hand-off to the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryCommand {
    pub component: String,
    pub kind: CommandKind,
    pub task_id: i64,
    pub body: Value,
}

struct Locked {
    config: RecoveryConfig,
    enabled: bool,
    statuses: StatusStore,
    cache: CommandCache,
    limiter: RateLimiter,
}

pub struct Controller {
    locked: Mutex<Locked>,
    active_command_count: AtomicI64,
    paused: AtomicBool,
    task_id_seq: AtomicI64,
    clock: Arc<dyn Clock>,
}

impl Controller {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let now = clock.now_secs();
        Self {
            locked: Mutex::new(Locked {
                config: RecoveryConfig::disabled(),
                enabled: false,
                statuses: StatusStore::new(),
                cache: CommandCache::new(),
                limiter: RateLimiter::new(),
            }),
            active_command_count: AtomicI64::new(0),
            paused: AtomicBool::new(false),
            task_id_seq: AtomicI64::new(now),
            clock,
        }
    }

    /// Validate and swap in new recovery parameters. Existing action
    /// counters are left untouched so the lifetime cap survives a
    /// reconfiguration. On failure, recovery is disabled and the typed
    /// error is returned (and logged) so callers can name the exact
    /// violated constraint.
    pub fn configure(
        &self,
        mode: RecoveryMode,
        max_count: u32,
        window_in_min: u32,
        retry_gap: u32,
        max_lifetime_count: u32,
    ) -> Result<(), ConfigError> {
        let mut locked = self.locked.lock().expect("controller lock poisoned");
        match RecoveryConfig::validate(mode, max_count, window_in_min, retry_gap, max_lifetime_count) {
            Ok(cfg) => {
                locked.enabled = cfg.mode.is_enabled();
                locked.config = cfg;
                Ok(())
            }
            Err(err) => {
                locked.enabled = false;
                warn!(error = %err, "recovery configuration rejected, disabling recovery");
                Err(err)
            }
        }
    }

    /// Parse and apply the registration response's `recoveryConfig`
    /// object, tolerating missing/non-integer fields before handing the
    /// coerced values to [`Controller::configure`].
    pub fn configure_from_raw(&self, raw: &RawRecoveryConfig) -> Result<(), ConfigError> {
        let (mode, max_count, window_in_min, retry_gap, max_lifetime_count) =
            coerce_recovery_config(raw);
        self.configure(mode, max_count, window_in_min, retry_gap, max_lifetime_count)
    }

    pub fn is_enabled(&self) -> bool {
        self.locked.lock().expect("controller lock poisoned").enabled
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn start_execution(&self) {
        self.active_command_count.fetch_add(1, Ordering::SeqCst);
    }

    pub fn stop_execution(&self) {
        self.active_command_count.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn has_active(&self) -> bool {
        self.active_command_count.load(Ordering::SeqCst) > 0
    }

    pub fn update_current(&self, component: &str, state: LifecycleState) {
        let mut locked = self.locked.lock().expect("controller lock poisoned");
        if !locked.enabled {
            return;
        }
        if locked.statuses.set_current(component, state) {
            locked.cache.remove(component);
        }
    }

    pub fn update_stale(&self, component: &str, stale: bool) {
        let mut locked = self.locked.lock().expect("controller lock poisoned");
        if !locked.enabled {
            return;
        }
        if locked.statuses.set_stale(component, stale) {
            locked.cache.remove(component);
        }
    }

    /// §4.F status-command ingestion.
    pub fn ingest_status_commands(&self, batch: &[StatusCommand]) {
        let mut locked = self.locked.lock().expect("controller lock poisoned");
        if !locked.enabled {
            return;
        }
        let now = self.clock.now_secs();
        for cmd in batch {
            let converged = locked.statuses.set_desired(&cmd.component_name, cmd.desired_state)
                | locked.statuses.set_stale(&cmd.component_name, cmd.has_stale_configs);
            if converged {
                locked.cache.remove(&cmd.component_name);
            }
            if cmd.payload_level == PayloadLevel::ExecutionCommand {
                match &cmd.execution_command_details {
                    Some(details) => {
                        locked.cache.remove(&cmd.component_name);
                        locked.cache.put(&cmd.component_name, details, now);
                    }
                    None => {
                        warn!(
                            component = %cmd.component_name,
                            "status command claims EXECUTION_COMMAND payload level but carries no executionCommandDetails"
                        );
                    }
                }
            }
        }
    }

    /// §4.F execution-command ingestion: tracks in-flight server-driven
    /// commands so their desired-state effect is visible before the
    /// next live-status report arrives.
    pub fn ingest_execution_commands(&self, batch: &[ExecutionCommand]) {
        let mut locked = self.locked.lock().expect("controller lock poisoned");
        if !locked.enabled {
            return;
        }
        for cmd in batch {
            let desired = match cmd.role_command.as_str() {
                "INSTALL" => Some(LifecycleState::Installed),
                "START" => Some(LifecycleState::Started),
                _ => None,
            };
            if let Some(desired) = desired {
                if locked.statuses.set_desired(&cmd.role, desired) {
                    locked.cache.remove(&cmd.role);
                }
            }
        }
    }

    fn next_task_id(&self) -> i64 {
        self.task_id_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// §4.F command collection. Runs entirely under one lock acquisition
    /// so a reconfiguration racing a tick is linearizable: the tick sees
    /// either the whole old parameter set or the whole new one.
    pub fn collect_commands(&self) -> Vec<RecoveryCommand> {
        let mut locked = self.locked.lock().expect("controller lock poisoned");
        if !locked.enabled {
            return Vec::new();
        }
        let now = self.clock.now_secs();
        let paused = self.paused.load(Ordering::SeqCst);
        let cfg = locked.config;

        let names: Vec<String> = locked
            .statuses
            .iter_ordered()
            .map(|(name, _)| name.to_string())
            .collect();

        let mut commands = Vec::new();
        for name in names {
            let status: ComponentStatus = match locked.statuses.get(&name) {
                Some(s) => s,
                None => continue,
            };
            let kind = match recovery_core::policy::evaluate(
                cfg.mode,
                status.desired,
                status.current,
                status.stale_config,
            ) {
                Some(kind) => kind,
                None => continue,
            };
            let (admission, first_denial) = locked.limiter.check(&name, &cfg, now);
            if !admission.admitted() {
                if first_denial {
                    warn!(component = %name, outcome = ?admission, "recovery rate-limited, skipping this tick");
                } else {
                    debug!(component = %name, outcome = ?admission, "recovery rate-limited, skipping this tick");
                }
                continue;
            }
            let Some(template) = locked.cache.get(&name, now) else {
                info!(component = %name, "recovery command cannot be computed, details not received");
                continue;
            };
            if paused {
                info!(component = %name, "recovery is paused, skipping");
                continue;
            }
            let outcome = locked.limiter.execute(&name, &cfg, now);
            if !outcome.admitted() {
                // Lost the race against a concurrent mutation between the
                // may_execute check above and this charge; discard.
                continue;
            }
            let task_id = self.next_task_id();
            let body = build_command_body(template, kind, task_id);
            commands.push(RecoveryCommand {
                component: name,
                kind,
                task_id,
                body,
            });
        }
        commands
    }

    /// §4.G: a rollup health report built from a snapshot of per-component
    /// attempt counts. Iterates components in the same deterministic
    /// order as `collect_commands`.
    pub fn snapshot_report(&self) -> RecoveryReport {
        let locked = self.locked.lock().expect("controller lock poisoned");
        // Only components that have actually attempted recovery at least
        // once belong to "the action table" the summary is computed over;
        // a component merely known to StatusStore but never rate-limited
        // would otherwise be miscounted as evidence of recoverability.
        let names: Vec<String> = locked
            .statuses
            .iter_ordered()
            .map(|(name, _)| name.to_string())
            .filter(|name| locked.limiter.counter(name).is_some())
            .collect();
        let snapshots: Vec<ComponentSnapshot<'_>> = names
            .iter()
            .map(|name| ComponentSnapshot {
                name: name.as_str(),
                lifetime_count: locked.limiter.lifetime_count(name),
            })
            .collect();
        summarize(locked.enabled, &locked.config, &snapshots)
    }
}

fn build_command_body(mut template: Value, kind: CommandKind, task_id: i64) -> Value {
    if let Value::Object(map) = &mut template {
        map.insert("roleCommand".to_string(), Value::String(kind.role_command().to_string()));
        map.insert(
            "commandType".to_string(),
            Value::String("AUTO_EXECUTION_COMMAND".to_string()),
        );
        map.insert("taskId".to_string(), Value::from(task_id));
        if matches!(kind, CommandKind::Restart) {
            let host_level_params = map
                .entry("hostLevelParams".to_string())
                .or_insert_with(|| Value::Object(serde_json::Map::new()));
            if let Value::Object(hlp) = host_level_params {
                hlp.insert("custom_command".to_string(), Value::String("RESTART".to_string()));
            }
        }
    }
    template
}
