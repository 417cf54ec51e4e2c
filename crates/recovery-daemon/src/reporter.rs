//! Rollup health reporting. The summarization rule is a pure function of
//! a snapshot, not of the live controller, so it stays unit-testable
//! without a running lock.

use recovery_core::RecoveryConfig;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecoverySummary {
    Disabled,
    Recoverable,
    PartiallyRecoverable,
    Unrecoverable,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentReport {
    pub name: String,
    #[serde(rename = "numAttempts")]
    pub num_attempts: u32,
    #[serde(rename = "limitReached")]
    pub limit_reached: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecoveryReport {
    pub summary: RecoverySummary,
    #[serde(rename = "componentReports")]
    pub component_reports: Vec<ComponentReport>,
}

/// A single component's observed attempt count, decoupled from any
/// locked store so this module can be tested with plain values.
pub struct ComponentSnapshot<'a> {
    pub name: &'a str,
    pub lifetime_count: u32,
}

/// Build the rollup report from a snapshot of component attempt counts.
pub fn summarize(enabled: bool, cfg: &RecoveryConfig, snapshots: &[ComponentSnapshot<'_>]) -> RecoveryReport {
    if !enabled {
        return RecoveryReport {
            summary: RecoverySummary::Disabled,
            component_reports: Vec::new(),
        };
    }

    let component_reports: Vec<ComponentReport> = snapshots
        .iter()
        .map(|s| ComponentReport {
            name: s.name.to_string(),
            num_attempts: s.lifetime_count,
            limit_reached: s.lifetime_count >= cfg.max_lifetime_count,
        })
        .collect();

    let n = component_reports.len();
    let k = component_reports.iter().filter(|r| r.limit_reached).count();
    let summary = if n == 0 || k == 0 {
        RecoverySummary::Recoverable
    } else if k == n {
        RecoverySummary::Unrecoverable
    } else {
        RecoverySummary::PartiallyRecoverable
    };

    RecoveryReport {
        summary,
        component_reports,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recovery_core::RecoveryMode;

    fn cfg(max_lifetime_count: u32) -> RecoveryConfig {
        RecoveryConfig::validate(RecoveryMode::Full, 2, 60, 5, max_lifetime_count).unwrap()
    }

    #[test]
    fn disabled_overrides_everything() {
        let report = summarize(false, &cfg(3), &[ComponentSnapshot { name: "A", lifetime_count: 3 }]);
        assert_eq!(report.summary, RecoverySummary::Disabled);
        assert!(report.component_reports.is_empty());
    }

    #[test]
    fn no_components_is_recoverable() {
        let report = summarize(true, &cfg(3), &[]);
        assert_eq!(report.summary, RecoverySummary::Recoverable);
    }

    #[test]
    fn all_below_limit_is_recoverable() {
        let report = summarize(
            true,
            &cfg(3),
            &[
                ComponentSnapshot { name: "A", lifetime_count: 1 },
                ComponentSnapshot { name: "B", lifetime_count: 2 },
            ],
        );
        assert_eq!(report.summary, RecoverySummary::Recoverable);
    }

    // ── scenario S5: lifetime cap reached on the sole component ──
    #[test]
    fn s5_sole_component_at_limit_is_unrecoverable() {
        let report = summarize(true, &cfg(3), &[ComponentSnapshot { name: "A", lifetime_count: 3 }]);
        assert_eq!(report.summary, RecoverySummary::Unrecoverable);
        assert!(report.component_reports[0].limit_reached);
    }

    #[test]
    fn mixed_components_are_partially_recoverable() {
        let report = summarize(
            true,
            &cfg(3),
            &[
                ComponentSnapshot { name: "A", lifetime_count: 3 },
                ComponentSnapshot { name: "B", lifetime_count: 0 },
            ],
        );
        assert_eq!(report.summary, RecoverySummary::PartiallyRecoverable);
    }
}
