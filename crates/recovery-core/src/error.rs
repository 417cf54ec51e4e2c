use thiserror::Error;

/// Why a proposed [`crate::config::RecoveryConfig`] was rejected.
///
/// One variant per constraint in the data model so a caller (and its
/// logging) can name the exact violated constraint rather than parsing a
/// formatted string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("maxCount must be greater than zero, got {0}")]
    MaxCountNotPositive(u32),

    #[error("windowInMinutes must be greater than zero, got {0}")]
    WindowNotPositive(u32),

    #[error("retryGap must be at least 1 minute, got {0}")]
    RetryGapNotPositive(u32),

    #[error("retryGap ({retry_gap}) must be less than windowInMinutes ({window})")]
    RetryGapExceedsWindow { retry_gap: u32, window: u32 },

    #[error("maxLifetimeCount ({max_lifetime}) must be at least maxCount ({max_count})")]
    LifetimeBelowMaxCount { max_lifetime: u32, max_count: u32 },
}
