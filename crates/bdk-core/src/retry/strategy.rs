//! Backoff scheduling abstraction and per-invocation attempt state.

use super::classify::ClassifiedFailure;
use std::time::Duration;
use tokio::time::Instant;

/// Scheduler decision after a recoverable failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delay {
    /// Wait this long, then make the next attempt.
    Wait(Duration),
    /// The attempt budget is spent.
    Stop,
}

impl Delay {
    /// The wait duration, or `None` for [`Delay::Stop`].
    pub fn duration(self) -> Option<Duration> {
        match self {
            Self::Wait(delay) => Some(delay),
            Self::Stop => None,
        }
    }
}

/// Transient state of one invocation.
///
/// Created when the invocation starts, advanced once per retry and dropped on
/// the terminal outcome. Never shared between invocations.
#[derive(Debug, Clone)]
pub struct AttemptState {
    attempt_number: u32,
    last_failure: Option<ClassifiedFailure>,
    started_at: Instant,
}

impl AttemptState {
    /// State for the first attempt of a new invocation.
    pub fn start() -> Self {
        Self::at(1)
    }

    /// State positioned at a given 1-based attempt number.
    pub fn at(attempt_number: u32) -> Self {
        Self {
            attempt_number: attempt_number.max(1),
            last_failure: None,
            started_at: Instant::now(),
        }
    }

    /// 1-based number of the attempt in flight (or just failed).
    pub fn attempt_number(&self) -> u32 {
        self.attempt_number
    }

    /// Classification of the most recent failure.
    pub fn last_failure(&self) -> Option<ClassifiedFailure> {
        self.last_failure
    }

    /// Time since the first attempt started.
    pub fn elapsed_since_first_attempt(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Record the classification of the attempt that just failed.
    pub fn record_failure(&mut self, failure: ClassifiedFailure) {
        self.last_failure = Some(failure);
    }

    /// Move on to the next attempt.
    pub fn advance(&mut self) {
        self.attempt_number = self.attempt_number.saturating_add(1);
    }
}

impl Default for AttemptState {
    fn default() -> Self {
        Self::start()
    }
}

/// Decides whether and when the next attempt happens.
///
/// The invoker consults the strategy only after a `Retryable` or
/// `AuthExpired` failure; `Fatal` failures never reach it.
///
/// # Examples
///
/// ```rust
/// use bdk_core::retry::{AttemptState, BackoffStrategy, Delay, ExponentialBackoff, RetryConfig};
/// use std::time::Duration;
///
/// let config = RetryConfig::new(3, 2.0, Duration::from_secs(1), Duration::from_secs(10)).unwrap();
/// let backoff = ExponentialBackoff::new(config);
///
/// assert_eq!(backoff.next_delay(&AttemptState::at(1)), Delay::Wait(Duration::from_secs(1)));
/// assert_eq!(backoff.next_delay(&AttemptState::at(2)), Delay::Wait(Duration::from_secs(2)));
/// assert_eq!(backoff.next_delay(&AttemptState::at(3)), Delay::Stop);
/// ```
pub trait BackoffStrategy: Send + Sync {
    /// Delay to wait after the attempt described by `state` failed.
    ///
    /// Returns [`Delay::Stop`] once `state.attempt_number() >= max_attempts()`.
    fn next_delay(&self, state: &AttemptState) -> Delay;

    /// Total attempt budget, first call included.
    fn max_attempts(&self) -> u32;
}
