//! Retry policy parameters and per-call overrides.

use crate::error::ConfigError;
use std::time::Duration;

/// Default attempt budget, including the first call.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;
/// Default delay before the first retry.
pub const DEFAULT_INITIAL_INTERVAL: Duration = Duration::from_millis(500);
/// Default exponential growth factor.
pub const DEFAULT_MULTIPLIER: f64 = 2.0;
/// Default upper bound for a single delay.
pub const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(300);

/// Immutable retry policy parameters.
///
/// A facade owns one `RetryConfig` and shares it read-only with every call it
/// makes. The invariant `initial_interval <= max_interval` is checked when the
/// value is built, so a `RetryConfig` in hand is always valid.
///
/// # Examples
///
/// ```rust
/// use bdk_core::retry::RetryConfig;
/// use std::time::Duration;
///
/// let config = RetryConfig::builder()
///     .max_attempts(3)
///     .multiplier(2.0)
///     .initial_interval(Duration::from_secs(1))
///     .max_interval(Duration::from_secs(10))
///     .build()
///     .unwrap();
///
/// assert_eq!(config.max_attempts(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    max_attempts: u32,
    multiplier: f64,
    initial_interval: Duration,
    max_interval: Duration,
    jitter: f64,
    deadline: Option<Duration>,
}

impl RetryConfig {
    /// Create a validated configuration from the four core parameters.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `max_attempts` is zero, `multiplier` is not
    /// a positive finite number, or `initial_interval > max_interval`.
    pub fn new(
        max_attempts: u32,
        multiplier: f64,
        initial_interval: Duration,
        max_interval: Duration,
    ) -> Result<Self, ConfigError> {
        Self::builder()
            .max_attempts(max_attempts)
            .multiplier(multiplier)
            .initial_interval(initial_interval)
            .max_interval(max_interval)
            .build()
    }

    /// Create a new builder seeded with the defaults.
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::default()
    }

    /// Total attempt budget, including the first call.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Exponential growth factor.
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Delay before the first retry.
    pub fn initial_interval(&self) -> Duration {
        self.initial_interval
    }

    /// Upper bound for any single delay.
    pub fn max_interval(&self) -> Duration {
        self.max_interval
    }

    /// Symmetric randomisation factor applied to each delay.
    pub fn jitter(&self) -> f64 {
        self.jitter
    }

    /// Optional overall wall-clock budget for one invocation.
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Apply per-call overrides on top of this configuration.
    ///
    /// Explicit values in `overrides` win; everything else comes from `self`.
    /// The merged value is validated again.
    pub fn merged(&self, overrides: &RetryOverrides) -> Result<Self, ConfigError> {
        RetryConfigBuilder {
            max_attempts: overrides.max_attempts.or(Some(self.max_attempts)),
            multiplier: overrides.multiplier.or(Some(self.multiplier)),
            initial_interval: overrides.initial_interval.or(Some(self.initial_interval)),
            max_interval: overrides.max_interval.or(Some(self.max_interval)),
            jitter: overrides.jitter.or(Some(self.jitter)),
            deadline: overrides.deadline.or(self.deadline),
        }
        .build()
    }
}

impl Default for RetryConfig {
    /// Defaults: 10 attempts, multiplier 2.0, 500ms initial, 5min max, no
    /// jitter, no deadline.
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            multiplier: DEFAULT_MULTIPLIER,
            initial_interval: DEFAULT_INITIAL_INTERVAL,
            max_interval: DEFAULT_MAX_INTERVAL,
            jitter: 0.0,
            deadline: None,
        }
    }
}

/// Builder for [`RetryConfig`].
#[derive(Debug, Default, Clone)]
pub struct RetryConfigBuilder {
    max_attempts: Option<u32>,
    multiplier: Option<f64>,
    initial_interval: Option<Duration>,
    max_interval: Option<Duration>,
    jitter: Option<f64>,
    deadline: Option<Duration>,
}

impl RetryConfigBuilder {
    /// Set the total attempt budget (first call included).
    ///
    /// Default: 10
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Set the exponential multiplier.
    ///
    /// Default: 2.0
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = Some(multiplier);
        self
    }

    /// Set the delay before the first retry.
    ///
    /// Default: 500ms
    pub fn initial_interval(mut self, interval: Duration) -> Self {
        self.initial_interval = Some(interval);
        self
    }

    /// Set the upper bound for a single delay.
    ///
    /// Default: 5 minutes
    pub fn max_interval(mut self, interval: Duration) -> Self {
        self.max_interval = Some(interval);
        self
    }

    /// Set the jitter factor (0.0 to 1.0). A jitter of 0.1 lets each delay
    /// vary by ±10% before clamping.
    ///
    /// Default: 0.0
    pub fn jitter(mut self, jitter: f64) -> Self {
        self.jitter = Some(jitter);
        self
    }

    /// Set an overall deadline for one invocation.
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<RetryConfig, ConfigError> {
        let max_attempts = self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS);
        let multiplier = self.multiplier.unwrap_or(DEFAULT_MULTIPLIER);
        let initial_interval = self.initial_interval.unwrap_or(DEFAULT_INITIAL_INTERVAL);
        let max_interval = self.max_interval.unwrap_or(DEFAULT_MAX_INTERVAL);
        let jitter = self.jitter.unwrap_or(0.0);

        if max_attempts == 0 {
            return Err(ConfigError::InvalidMaxAttempts(max_attempts));
        }
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(ConfigError::InvalidMultiplier(multiplier));
        }
        if initial_interval > max_interval {
            return Err(ConfigError::IntervalOrder {
                initial: initial_interval,
                max: max_interval,
            });
        }
        if !(0.0..=1.0).contains(&jitter) {
            return Err(ConfigError::InvalidJitter(jitter));
        }

        Ok(RetryConfig {
            max_attempts,
            multiplier,
            initial_interval,
            max_interval,
            jitter,
            deadline: self.deadline,
        })
    }
}

/// Call-site overrides for a single invocation.
///
/// Every field is optional; set fields replace the facade-level value for
/// that one call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetryOverrides {
    /// Override for the attempt budget
    pub max_attempts: Option<u32>,
    /// Override for the multiplier
    pub multiplier: Option<f64>,
    /// Override for the first delay
    pub initial_interval: Option<Duration>,
    /// Override for the delay cap
    pub max_interval: Option<Duration>,
    /// Override for the jitter factor
    pub jitter: Option<f64>,
    /// Override for the overall deadline
    pub deadline: Option<Duration>,
}

impl RetryOverrides {
    /// Overrides that change nothing.
    pub fn none() -> Self {
        Self::default()
    }

    /// Override the attempt budget.
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Override the multiplier.
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = Some(multiplier);
        self
    }

    /// Override the first delay.
    pub fn initial_interval(mut self, interval: Duration) -> Self {
        self.initial_interval = Some(interval);
        self
    }

    /// Override the delay cap.
    pub fn max_interval(mut self, interval: Duration) -> Self {
        self.max_interval = Some(interval);
        self
    }

    /// Override the overall deadline.
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RetryConfig::default();

        assert_eq!(config.max_attempts(), 10);
        assert_eq!(config.multiplier(), 2.0);
        assert_eq!(config.initial_interval(), Duration::from_millis(500));
        assert_eq!(config.max_interval(), Duration::from_secs(300));
        assert_eq!(config.jitter(), 0.0);
        assert_eq!(config.deadline(), None);
        assert_eq!(RetryConfig::builder().build().unwrap(), config);
    }

    #[test]
    fn test_interval_order_is_enforced() {
        let err = RetryConfig::new(3, 2.0, Duration::from_secs(10), Duration::from_secs(1))
            .unwrap_err();

        assert_eq!(
            err,
            ConfigError::IntervalOrder {
                initial: Duration::from_secs(10),
                max: Duration::from_secs(1),
            }
        );
    }

    #[test]
    fn test_equal_intervals_are_valid() {
        let config =
            RetryConfig::new(3, 1.0, Duration::from_secs(2), Duration::from_secs(2)).unwrap();
        assert_eq!(config.initial_interval(), config.max_interval());
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert_eq!(
            RetryConfig::builder().max_attempts(0).build().unwrap_err(),
            ConfigError::InvalidMaxAttempts(0)
        );
        assert!(matches!(
            RetryConfig::builder().multiplier(0.0).build(),
            Err(ConfigError::InvalidMultiplier(_))
        ));
        assert!(matches!(
            RetryConfig::builder().multiplier(f64::NAN).build(),
            Err(ConfigError::InvalidMultiplier(_))
        ));
        assert!(matches!(
            RetryConfig::builder().jitter(1.5).build(),
            Err(ConfigError::InvalidJitter(_))
        ));
    }

    #[test]
    fn test_overrides_win_over_facade_values() {
        let base = RetryConfig::new(5, 2.0, Duration::from_secs(1), Duration::from_secs(30)).unwrap();
        let overrides = RetryOverrides::none()
            .max_attempts(2)
            .initial_interval(Duration::from_millis(10));

        let merged = base.merged(&overrides).unwrap();

        assert_eq!(merged.max_attempts(), 2);
        assert_eq!(merged.initial_interval(), Duration::from_millis(10));
        assert_eq!(merged.multiplier(), 2.0);
        assert_eq!(merged.max_interval(), Duration::from_secs(30));
    }

    #[test]
    fn test_empty_overrides_keep_config() {
        let base = RetryConfig::default();

        assert!(RetryOverrides::none().is_empty());
        assert_eq!(base.merged(&RetryOverrides::none()).unwrap(), base);
    }

    #[test]
    fn test_merged_config_is_revalidated() {
        let base = RetryConfig::new(5, 2.0, Duration::from_secs(1), Duration::from_secs(2)).unwrap();
        let overrides = RetryOverrides::none().initial_interval(Duration::from_secs(5));

        assert!(matches!(
            base.merged(&overrides),
            Err(ConfigError::IntervalOrder { .. })
        ));
    }
}
