use crate::error::ConfigError;
use crate::types::RecoveryMode;

/// Validated recovery parameters. Construct via [`RecoveryConfig::validate`];
/// there is no public way to obtain an instance that skips validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryConfig {
    pub mode: RecoveryMode,
    pub max_count: u32,
    pub window_in_min: u32,
    pub retry_gap: u32,
    pub max_lifetime_count: u32,
}

impl RecoveryConfig {
    pub const DEFAULT_MAX_COUNT: u32 = 6;
    pub const DEFAULT_WINDOW_IN_MIN: u32 = 60;
    pub const DEFAULT_RETRY_GAP: u32 = 5;
    pub const DEFAULT_MAX_LIFETIME_COUNT: u32 = 12;

    /// Validate a proposed set of parameters against the constraints in
    /// the data model. `mode = Disabled` always validates (there is
    /// nothing to check, since recovery will be off regardless).
    pub fn validate(
        mode: RecoveryMode,
        max_count: u32,
        window_in_min: u32,
        retry_gap: u32,
        max_lifetime_count: u32,
    ) -> Result<Self, ConfigError> {
        if mode != RecoveryMode::Disabled {
            if max_count == 0 {
                return Err(ConfigError::MaxCountNotPositive(max_count));
            }
            if window_in_min == 0 {
                return Err(ConfigError::WindowNotPositive(window_in_min));
            }
            if retry_gap == 0 {
                return Err(ConfigError::RetryGapNotPositive(retry_gap));
            }
            if retry_gap >= window_in_min {
                return Err(ConfigError::RetryGapExceedsWindow {
                    retry_gap,
                    window: window_in_min,
                });
            }
            if max_lifetime_count < max_count {
                return Err(ConfigError::LifetimeBelowMaxCount {
                    max_lifetime: max_lifetime_count,
                    max_count,
                });
            }
        }
        Ok(Self {
            mode,
            max_count,
            window_in_min,
            retry_gap,
            max_lifetime_count,
        })
    }

    /// `recoveryConfig.type = DEFAULT`'s parameters, per §6: recovery is
    /// off so the numeric fields are irrelevant but still need to satisfy
    /// the type; the documented defaults are used.
    pub fn disabled() -> Self {
        Self {
            mode: RecoveryMode::Disabled,
            max_count: Self::DEFAULT_MAX_COUNT,
            window_in_min: Self::DEFAULT_WINDOW_IN_MIN,
            retry_gap: Self::DEFAULT_RETRY_GAP,
            max_lifetime_count: Self::DEFAULT_MAX_LIFETIME_COUNT,
        }
    }

    pub fn window_secs(&self) -> i64 {
        i64::from(self.window_in_min) * 60
    }

    pub fn retry_gap_secs(&self) -> i64 {
        i64::from(self.retry_gap) * 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_max_count() {
        let err = RecoveryConfig::validate(RecoveryMode::Full, 0, 60, 5, 12).unwrap_err();
        assert_eq!(err, ConfigError::MaxCountNotPositive(0));
    }

    #[test]
    fn rejects_retry_gap_not_below_window() {
        let err = RecoveryConfig::validate(RecoveryMode::Full, 6, 5, 5, 12).unwrap_err();
        assert_eq!(
            err,
            ConfigError::RetryGapExceedsWindow {
                retry_gap: 5,
                window: 5
            }
        );
    }

    #[test]
    fn rejects_lifetime_below_max_count() {
        let err = RecoveryConfig::validate(RecoveryMode::Full, 6, 60, 5, 3).unwrap_err();
        assert_eq!(
            err,
            ConfigError::LifetimeBelowMaxCount {
                max_lifetime: 3,
                max_count: 6
            }
        );
    }

    #[test]
    fn disabled_mode_skips_validation() {
        let cfg = RecoveryConfig::validate(RecoveryMode::Disabled, 0, 0, 0, 0).unwrap();
        assert_eq!(cfg.mode, RecoveryMode::Disabled);
    }

    #[test]
    fn accepts_well_formed_config() {
        let cfg = RecoveryConfig::validate(RecoveryMode::AutoStart, 6, 60, 5, 12).unwrap();
        assert_eq!(cfg.window_secs(), 3600);
        assert_eq!(cfg.retry_gap_secs(), 300);
    }
}
