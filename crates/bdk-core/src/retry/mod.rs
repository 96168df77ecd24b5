//! Retry policy: classification, backoff, credential refresh and the
//! invoker that composes them.
//!
//! # Key Types
//!
//! - [`RetryConfig`] - immutable policy parameters
//! - [`FailureClassifier`] - maps a failure to [`ClassifiedFailure`]
//! - [`BackoffStrategy`] / [`ExponentialBackoff`] - delay schedule and attempt budget
//! - [`AuthRefreshGuard`] - refreshes credentials on `AuthExpired`
//! - [`RetryableInvoker`] - wraps one outbound call with the whole policy
//!
//! # Examples
//!
//! ```rust
//! use bdk_core::retry::{RetryConfig, RetryableInvoker};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let invoker = RetryableInvoker::new(
//!     RetryConfig::builder()
//!         .max_attempts(3)
//!         .initial_interval(Duration::from_millis(100))
//!         .build()?,
//! );
//!
//! let result = invoker.invoke(|| async {
//!     // Your outbound call here
//!     Ok::<_, std::io::Error>(42)
//! }).await?;
//! # Ok(())
//! # }
//! ```

mod auth;
mod classify;
mod config;
mod exponential;
mod invoker;
mod strategy;

pub use auth::{AuthRefreshGuard, CredentialRefresher, GuardState, Token};
pub use classify::{
    ClassifiedFailure, FailureClassifier, OutboundFailure, StatusClassifier, TransientCause,
};
pub use config::{
    DEFAULT_INITIAL_INTERVAL, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_INTERVAL, DEFAULT_MULTIPLIER,
    RetryConfig, RetryConfigBuilder, RetryOverrides,
};
pub use exponential::ExponentialBackoff;
pub use invoker::{InvokeOptions, RetryableInvoker};
pub use strategy::{AttemptState, BackoffStrategy, Delay};
