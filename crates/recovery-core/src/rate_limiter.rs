//! Per-component attempt admission: burst count, sliding window and a
//! lifetime cap. Pure, deterministic state machine — all time values are
//! passed in as parameters (no system clock access), the same shape as
//! the restart/backoff tracker this was modeled on.

use crate::config::RecoveryConfig;
use std::collections::HashMap;

/// Per-component bookkeeping. `warned_*` flags exist only so the
/// orchestration layer can decide "first deny → warn, repeat deny →
/// debug"; they carry no admission semantics of their own.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionCounter {
    pub count: u32,
    pub last_attempt: i64,
    pub last_reset: i64,
    pub lifetime_count: u32,
    pub warned_last_attempt: bool,
    pub warned_last_reset: bool,
    pub warned_lifetime: bool,
}

/// Outcome of an admission attempt, rich enough for the caller to decide
/// how (and whether) to log without the rate limiter depending on a
/// logging crate itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmitOutcome {
    Admitted,
    DeniedRetryGap,
    DeniedWindowSaturated,
    DeniedLifetimeExceeded,
}

impl AdmitOutcome {
    pub fn admitted(&self) -> bool {
        matches!(self, AdmitOutcome::Admitted)
    }
}

#[derive(Debug, Default)]
pub struct RateLimiter {
    counters: HashMap<String, ActionCounter>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pure query: would an immediate `execute` succeed? Does not mutate
    /// state, so a counter that has never been referenced is evaluated
    /// against a transient default rather than being materialized in the
    /// table — the decision is identical either way.
    pub fn may_execute(&self, name: &str, cfg: &RecoveryConfig, now: i64) -> bool {
        let counter = self.counters.get(name).copied().unwrap_or_default();
        decide(&counter, cfg, now).admitted()
    }

    /// Like `may_execute`, but also updates the one-shot `warned_*`
    /// flags and reports whether this is the first time `name` has
    /// transitioned into its current outcome (`true` → caller should log
    /// at warn, `false` → debug). Unlike `execute`, this never touches
    /// `count`, `lifetime_count`, `last_attempt` or `last_reset` — the
    /// warning flags are logging-only bookkeeping (see the design note
    /// on them), so updating them is not itself an admission attempt.
    pub fn check(&mut self, name: &str, cfg: &RecoveryConfig, now: i64) -> (AdmitOutcome, bool) {
        let counter = self.counters.entry(name.to_string()).or_default();
        let outcome = decide(counter, cfg, now);
        let first_occurrence = note_warn_transition(counter, cfg, outcome);
        (outcome, first_occurrence)
    }

    /// Attempt to admit one recovery action for `name`. On success,
    /// updates the counter and returns `AdmitOutcome::Admitted`.
    pub fn execute(&mut self, name: &str, cfg: &RecoveryConfig, now: i64) -> AdmitOutcome {
        let counter = self.counters.entry(name.to_string()).or_default();
        let outcome = decide(counter, cfg, now);
        note_warn_transition(counter, cfg, outcome);
        apply(counter, cfg, now, outcome);
        outcome
    }

    pub fn counter(&self, name: &str) -> Option<&ActionCounter> {
        self.counters.get(name)
    }

    pub fn lifetime_count(&self, name: &str) -> u32 {
        self.counters.get(name).map(|c| c.lifetime_count).unwrap_or(0)
    }
}

/// §4.B admission algorithm, read-only: decide what *would* happen to
/// `counter` at `now` under `cfg`, without mutating it.
fn decide(counter: &ActionCounter, cfg: &RecoveryConfig, now: i64) -> AdmitOutcome {
    if counter.lifetime_count >= cfg.max_lifetime_count {
        return AdmitOutcome::DeniedLifetimeExceeded;
    }
    if counter.count < cfg.max_count {
        if now - counter.last_attempt > cfg.retry_gap_secs() {
            AdmitOutcome::Admitted
        } else {
            AdmitOutcome::DeniedRetryGap
        }
    } else if now - counter.last_reset > cfg.window_secs() {
        AdmitOutcome::Admitted
    } else {
        AdmitOutcome::DeniedWindowSaturated
    }
}

/// Mutate `counter`'s admission fields (`count`, `lifetime_count`,
/// `last_attempt`, `last_reset`) to reflect an already-decided outcome.
/// Only called from `execute`; `may_execute`/`check` never reach here.
/// Warn-flag bookkeeping is handled separately by `note_warn_transition`
/// so `check` can share it without charging an attempt.
fn apply(counter: &mut ActionCounter, cfg: &RecoveryConfig, now: i64, outcome: AdmitOutcome) {
    match outcome {
        AdmitOutcome::Admitted if counter.count < cfg.max_count => {
            counter.count += 1;
            counter.lifetime_count += 1;
            if cfg.retry_gap > 0 {
                counter.last_attempt = now;
            }
            if counter.count == 1 {
                counter.last_reset = now;
            }
        }
        AdmitOutcome::Admitted => {
            // window rolled over
            counter.count = 1;
            counter.lifetime_count += 1;
            counter.last_reset = now;
            if cfg.retry_gap > 0 {
                counter.last_attempt = now;
            }
        }
        AdmitOutcome::DeniedRetryGap
        | AdmitOutcome::DeniedWindowSaturated
        | AdmitOutcome::DeniedLifetimeExceeded => {}
    }
}

/// Update the one-shot `warned_*` flags for a just-decided `outcome`,
/// keyed off the same branch condition `decide`/`apply` use (`counter`
/// reflects pre-admission state here in both `check` and `execute`, so
/// the condition is evaluated identically in either caller). Returns
/// `true` if this is the first time the deny state is being entered
/// (caller should log at warn), `false` for a repeat (debug), or for
/// `Admitted` (no log needed, the relevant flag is simply cleared).
fn note_warn_transition(counter: &mut ActionCounter, cfg: &RecoveryConfig, outcome: AdmitOutcome) -> bool {
    match outcome {
        AdmitOutcome::Admitted if counter.count < cfg.max_count => {
            counter.warned_last_attempt = false;
            false
        }
        AdmitOutcome::Admitted => {
            counter.warned_last_reset = false;
            false
        }
        AdmitOutcome::DeniedRetryGap => {
            let first = !counter.warned_last_attempt;
            counter.warned_last_attempt = true;
            first
        }
        AdmitOutcome::DeniedWindowSaturated => {
            let first = !counter.warned_last_reset;
            counter.warned_last_reset = true;
            first
        }
        AdmitOutcome::DeniedLifetimeExceeded => {
            let first = !counter.warned_lifetime;
            counter.warned_lifetime = true;
            first
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecoveryMode;

    fn cfg(max_count: u32, window_in_min: u32, retry_gap: u32, max_lifetime_count: u32) -> RecoveryConfig {
        RecoveryConfig::validate(RecoveryMode::Full, max_count, window_in_min, retry_gap, max_lifetime_count)
            .unwrap()
    }

    const BASE: i64 = 1_700_000_000;

    // ── scenario S3: retry-gap deny then admit ──
    #[test]
    fn s3_retry_gap_deny_then_admit() {
        let cfg = cfg(2, 60, 5, 3);
        let mut rl = RateLimiter::new();

        let first = rl.execute("A", &cfg, BASE);
        assert_eq!(first, AdmitOutcome::Admitted);
        assert_eq!(rl.counter("A").unwrap().count, 1);
        assert_eq!(rl.counter("A").unwrap().lifetime_count, 1);

        let second = rl.execute("A", &cfg, BASE + 60);
        assert_eq!(second, AdmitOutcome::DeniedRetryGap);
        assert_eq!(rl.counter("A").unwrap().count, 1);

        let third = rl.execute("A", &cfg, BASE + 301);
        assert_eq!(third, AdmitOutcome::Admitted);
        assert_eq!(rl.counter("A").unwrap().count, 2);
        assert_eq!(rl.counter("A").unwrap().lifetime_count, 2);
    }

    // ── scenario S4: window saturation then roll ──
    #[test]
    fn s4_window_saturation_then_roll() {
        let cfg = cfg(2, 60, 5, 3);
        let mut rl = RateLimiter::new();
        rl.execute("A", &cfg, BASE);
        rl.execute("A", &cfg, BASE + 301);

        let denied = rl.execute("A", &cfg, BASE + 602);
        assert_eq!(denied, AdmitOutcome::DeniedWindowSaturated);

        let rolled = rl.execute("A", &cfg, BASE + 3601);
        assert_eq!(rolled, AdmitOutcome::Admitted);
        assert_eq!(rl.counter("A").unwrap().count, 1);
        assert_eq!(rl.counter("A").unwrap().lifetime_count, 3);
    }

    // ── scenario S5: lifetime cap ──
    #[test]
    fn s5_lifetime_cap_denies_regardless_of_window() {
        let cfg = cfg(2, 60, 5, 3);
        let mut rl = RateLimiter::new();
        rl.execute("A", &cfg, BASE);
        rl.execute("A", &cfg, BASE + 301);
        rl.execute("A", &cfg, BASE + 3601);
        assert_eq!(rl.counter("A").unwrap().lifetime_count, 3);

        let denied = rl.execute("A", &cfg, BASE + 100_000);
        assert_eq!(denied, AdmitOutcome::DeniedLifetimeExceeded);
    }

    #[test]
    fn may_execute_does_not_materialize_unseen_counter() {
        let cfg = cfg(2, 60, 5, 3);
        let rl = RateLimiter::new();
        assert!(rl.may_execute("never-seen", &cfg, BASE));
        assert!(rl.counter("never-seen").is_none());
    }

    #[test]
    fn may_execute_agrees_with_execute() {
        let cfg = cfg(2, 60, 5, 3);
        let mut rl = RateLimiter::new();
        rl.execute("A", &cfg, BASE);
        assert!(!rl.may_execute("A", &cfg, BASE + 60));
        assert!(rl.may_execute("A", &cfg, BASE + 301));
    }

    #[test]
    fn retry_gap_zero_never_updates_last_attempt() {
        // validate() rejects retry_gap == 0 for any enabled mode, so the
        // only way to construct one is through Disabled, which skips the
        // numeric checks entirely (config.rs). rate_limiter itself never
        // looks at `mode`, so this still exercises the branch in `apply`
        // that skips updating `last_attempt` when retry_gap is zero.
        let cfg = RecoveryConfig::validate(RecoveryMode::Disabled, 2, 60, 0, 3).unwrap();
        let mut rl = RateLimiter::new();
        rl.execute("A", &cfg, BASE);
        assert_eq!(rl.counter("A").unwrap().last_attempt, 0);
    }

    // ── check(): first denial warns, repeats debug, admission clears ──
    #[test]
    fn check_warns_once_then_debugs_on_repeated_retry_gap_denial() {
        let cfg = cfg(2, 60, 5, 3);
        let mut rl = RateLimiter::new();
        rl.execute("A", &cfg, BASE);

        let (outcome, first) = rl.check("A", &cfg, BASE + 10);
        assert_eq!(outcome, AdmitOutcome::DeniedRetryGap);
        assert!(first, "first denial should be reported as warn-worthy");

        let (outcome, first) = rl.check("A", &cfg, BASE + 20);
        assert_eq!(outcome, AdmitOutcome::DeniedRetryGap);
        assert!(!first, "repeated denial should not warn again");
    }

    #[test]
    fn check_clears_warn_flag_once_admitted_again() {
        let cfg = cfg(2, 60, 5, 3);
        let mut rl = RateLimiter::new();
        rl.execute("A", &cfg, BASE);
        rl.check("A", &cfg, BASE + 10);
        assert!(rl.counter("A").unwrap().warned_last_attempt);

        let (outcome, _) = rl.check("A", &cfg, BASE + 301);
        assert_eq!(outcome, AdmitOutcome::Admitted);
        assert!(!rl.counter("A").unwrap().warned_last_attempt);

        // check() never charges an attempt, so a later, real execute()
        // still sees the same admissible state.
        assert_eq!(rl.counter("A").unwrap().count, 1);
        let executed = rl.execute("A", &cfg, BASE + 301);
        assert_eq!(executed, AdmitOutcome::Admitted);
    }

    #[test]
    fn check_warns_once_then_debugs_on_lifetime_exceeded() {
        let cfg = cfg(1, 60, 1, 1);
        let mut rl = RateLimiter::new();
        rl.execute("A", &cfg, BASE);

        let (outcome, first) = rl.check("A", &cfg, BASE + 100_000);
        assert_eq!(outcome, AdmitOutcome::DeniedLifetimeExceeded);
        assert!(first);

        let (outcome, first) = rl.check("A", &cfg, BASE + 200_000);
        assert_eq!(outcome, AdmitOutcome::DeniedLifetimeExceeded);
        assert!(!first);
    }

    proptest::proptest! {
        #[test]
        fn lifetime_count_never_exceeds_cap(
            max_count in 1u32..5,
            max_lifetime in 1u32..20,
            steps in proptest::collection::vec(0i64..500, 0..50),
        ) {
            let max_lifetime = max_lifetime.max(max_count);
            let cfg = cfg(max_count, 60, 1, max_lifetime);
            let mut rl = RateLimiter::new();
            let mut now = BASE;
            for delta in steps {
                now += delta;
                rl.execute("A", &cfg, now);
                let lifetime = rl.counter("A").map(|c| c.lifetime_count).unwrap_or(0);
                proptest::prop_assert!(lifetime <= max_lifetime);
            }
        }

        #[test]
        fn admitted_attempts_respect_retry_gap(
            retry_gap_min in 1u32..10,
            steps in proptest::collection::vec(0i64..400, 0..40),
        ) {
            let cfg = cfg(1000, 100_000, retry_gap_min, 1000);
            let mut rl = RateLimiter::new();
            let mut now = BASE;
            let mut last_admitted: Option<i64> = None;
            for delta in steps {
                now += delta;
                let outcome = rl.execute("A", &cfg, now);
                if outcome.admitted() {
                    if let Some(prev) = last_admitted {
                        proptest::prop_assert!(now - prev > cfg.retry_gap_secs());
                    }
                    last_admitted = Some(now);
                }
            }
        }
    }
}
