//! Error types for the retry policy layer.

use std::time::Duration;
use thiserror::Error;

/// Message surfaced when an expired session cannot be refreshed.
pub const UNAUTHORIZED_MESSAGE: &str =
    "Service account is not authorized to authenticate. Check if credentials are valid.";

/// Terminal outcome of an invocation that did not succeed.
///
/// Only `Retryable` and `AuthExpired` failures are handled locally by the
/// invoker; every variant here is what the caller finally sees. Variants that
/// wrap a failure always carry the last real cause, never a synthetic one.
#[derive(Debug, Error)]
pub enum RetryError<E>
where
    E: std::error::Error + 'static,
{
    /// The failure was classified `Fatal` and propagated on first occurrence.
    #[error("request failed on attempt {attempts}: {source}")]
    Fatal {
        /// Attempts made, including the failing one
        attempts: u32,
        /// The failure returned by the call
        source: E,
    },

    /// The session expired and could not be refreshed.
    #[error("{} (after {attempts} attempt(s))", UNAUTHORIZED_MESSAGE)]
    AuthUnauthorized {
        /// Attempts made before giving up
        attempts: u32,
        /// Why the refresh did not happen
        source: AuthError,
    },

    /// The backoff schedule ran out of attempts.
    #[error("retries exhausted after {attempts} attempts: {source}")]
    Exhausted {
        /// Attempts made
        attempts: u32,
        /// The last failure returned by the call
        source: E,
    },

    /// Waiting for the next attempt would overrun the configured deadline.
    #[error("retry deadline of {deadline:?} exceeded after {attempts} attempts ({elapsed:?} elapsed): {source}")]
    DeadlineExceeded {
        /// Attempts made
        attempts: u32,
        /// Time spent since the first attempt started
        elapsed: Duration,
        /// The configured overall budget
        deadline: Duration,
        /// The last failure returned by the call
        source: E,
    },

    /// The enclosing context cancelled the invocation.
    #[error("invocation cancelled after {attempts} attempt(s)")]
    Cancelled {
        /// Attempts started before cancellation
        attempts: u32,
    },

    /// Per-call overrides produced an invalid policy; nothing was attempted.
    #[error("invalid retry policy: {0}")]
    InvalidPolicy(#[source] ConfigError),
}

impl<E> RetryError<E>
where
    E: std::error::Error + 'static,
{
    /// Number of attempts made before this outcome.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Fatal { attempts, .. }
            | Self::AuthUnauthorized { attempts, .. }
            | Self::Exhausted { attempts, .. }
            | Self::DeadlineExceeded { attempts, .. }
            | Self::Cancelled { attempts } => *attempts,
            Self::InvalidPolicy(_) => 0,
        }
    }

    /// The last failure returned by the call, if this outcome carries one.
    pub fn last_failure(&self) -> Option<&E> {
        match self {
            Self::Fatal { source, .. }
            | Self::Exhausted { source, .. }
            | Self::DeadlineExceeded { source, .. } => Some(source),
            Self::AuthUnauthorized { .. } | Self::Cancelled { .. } | Self::InvalidPolicy(_) => None,
        }
    }

    /// Consume the error and return the wrapped call failure, if any.
    pub fn into_last_failure(self) -> Option<E> {
        match self {
            Self::Fatal { source, .. }
            | Self::Exhausted { source, .. }
            | Self::DeadlineExceeded { source, .. } => Some(source),
            Self::AuthUnauthorized { .. } | Self::Cancelled { .. } | Self::InvalidPolicy(_) => None,
        }
    }

    /// Whether the invocation ended because credentials could not be refreshed.
    pub fn is_auth_unauthorized(&self) -> bool {
        matches!(self, Self::AuthUnauthorized { .. })
    }
}

/// Failure of the authentication collaborator.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A call failed with an expired session but nothing can refresh it.
    #[error("no credential refresher is configured")]
    MissingRefresher,

    /// The authentication service rejected the credentials.
    #[error("credentials rejected: {0}")]
    Unauthorized(String),

    /// Re-authentication failed for another reason.
    #[error("credential refresh failed: {message}")]
    Refresh {
        /// Human readable description
        message: String,
        /// Underlying cause
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl AuthError {
    /// Wrap an arbitrary error as a refresh failure.
    pub fn refresh<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Refresh {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

/// Invalid retry policy parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// `max_attempts` must be at least 1.
    #[error("max_attempts must be at least 1, got {0}")]
    InvalidMaxAttempts(u32),

    /// `multiplier` must be finite and strictly positive.
    #[error("multiplier must be a finite value greater than 0, got {0}")]
    InvalidMultiplier(f64),

    /// `initial_interval` is larger than `max_interval`.
    #[error("initial_interval ({initial:?}) must not exceed max_interval ({max:?})")]
    IntervalOrder {
        /// Configured initial interval
        initial: Duration,
        /// Configured maximum interval
        max: Duration,
    },

    /// `jitter` must be within `0.0..=1.0`.
    #[error("jitter must be within 0.0..=1.0, got {0}")]
    InvalidJitter(f64),
}
