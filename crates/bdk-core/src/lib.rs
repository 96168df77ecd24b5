#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Core retry policy for the BDK ecosystem.
//!
//! Every outbound call made by the SDK goes through a [`RetryableInvoker`],
//! which composes:
//!
//! - **Classification** via [`FailureClassifier`]: a failure is tagged once as
//!   `Retryable`, `AuthExpired` or `Fatal`
//! - **Backoff** via [`BackoffStrategy`]: exponential delays bounded by an
//!   attempt budget
//! - **Credential refresh** via [`AuthRefreshGuard`]: an expired session is
//!   refreshed before the next attempt instead of being retried blindly
//!
//! # Examples
//!
//! ```rust
//! use bdk_core::prelude::*;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RetryConfig::builder()
//!     .max_attempts(3)
//!     .initial_interval(Duration::from_millis(100))
//!     .build()?;
//!
//! let invoker = RetryableInvoker::new(config);
//! let value = invoker
//!     .invoke(|| async { Ok::<_, std::io::Error>(42) })
//!     .await?;
//! assert_eq!(value, 42);
//! # Ok(())
//! # }
//! ```
//!
//! [`RetryableInvoker`]: retry::RetryableInvoker
//! [`FailureClassifier`]: retry::FailureClassifier
//! [`BackoffStrategy`]: retry::BackoffStrategy
//! [`AuthRefreshGuard`]: retry::AuthRefreshGuard

pub mod error;
pub mod retry;

pub use error::{AuthError, ConfigError, RetryError};

/// Convenient re-exports of commonly used items.
///
/// ```rust
/// use bdk_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{AuthError, ConfigError, RetryError};
    pub use crate::retry::{
        AttemptState, AuthRefreshGuard, BackoffStrategy, ClassifiedFailure, CredentialRefresher,
        Delay, ExponentialBackoff, FailureClassifier, InvokeOptions, OutboundFailure,
        RetryConfig, RetryConfigBuilder, RetryOverrides, RetryableInvoker, StatusClassifier,
        Token, TransientCause,
    };
}
