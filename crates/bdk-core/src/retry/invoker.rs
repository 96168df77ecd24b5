//! Call-site retry wrapper composing classification, backoff and refresh.

use super::auth::{AuthRefreshGuard, CredentialRefresher};
use super::classify::{ClassifiedFailure, FailureClassifier, OutboundFailure, StatusClassifier};
use super::config::{RetryConfig, RetryOverrides};
use super::exponential::ExponentialBackoff;
use super::strategy::{AttemptState, BackoffStrategy, Delay};
use crate::error::RetryError;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Per-invocation options.
#[derive(Clone, Default)]
pub struct InvokeOptions {
    /// Policy values that win over the invoker's configuration for this call.
    pub overrides: RetryOverrides,
    /// Classifier used instead of the invoker's one for this call.
    pub classifier: Option<Arc<dyn FailureClassifier>>,
    /// Token of the enclosing context; cancelling it aborts the invocation.
    pub cancellation: Option<CancellationToken>,
}

impl InvokeOptions {
    /// Options that change nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set per-call policy overrides.
    pub fn overrides(mut self, overrides: RetryOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Use a different classifier for this call.
    pub fn classifier(mut self, classifier: Arc<dyn FailureClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Abort the invocation when `token` is cancelled.
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

impl fmt::Debug for InvokeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvokeOptions")
            .field("overrides", &self.overrides)
            .field("custom_classifier", &self.classifier.is_some())
            .field("cancellation", &self.cancellation)
            .finish()
    }
}

/// Retry policy applied to outbound calls.
///
/// Each call to [`invoke`](Self::invoke) runs its own sequential loop:
///
/// 1. run the operation; success is returned as is
/// 2. classify the failure; `Fatal` is returned immediately
/// 3. the backoff schedule either stops (the last failure is returned inside
///    `Exhausted`) or yields a delay to sleep before the next attempt
/// 4. `AuthExpired` asks the [`CredentialRefresher`] for a new session before
///    that delay; a failed refresh ends the invocation with `AuthUnauthorized`.
///    No refresh happens when the schedule already stopped. Without a
///    refresher an expiry is always `AuthUnauthorized`.
///
/// The invoker only shares the read-only configuration between calls, so one
/// instance can serve any number of concurrent invocations. Only wrap
/// operations that are safe to repeat.
///
/// # Examples
///
/// ```rust
/// use bdk_core::retry::{RetryConfig, RetryableInvoker};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let invoker = RetryableInvoker::new(
///     RetryConfig::new(3, 2.0, Duration::from_millis(10), Duration::from_secs(1))?,
/// );
///
/// let body = invoker
///     .invoke(|| async { Ok::<_, std::io::Error>("pong") })
///     .await?;
/// assert_eq!(body, "pong");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RetryableInvoker {
    config: Arc<RetryConfig>,
    classifier: Arc<dyn FailureClassifier>,
    refresher: Option<Arc<dyn CredentialRefresher>>,
}

impl RetryableInvoker {
    /// Create an invoker with the default [`StatusClassifier`] and no
    /// credential refresher.
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config: Arc::new(config),
            classifier: Arc::new(StatusClassifier),
            refresher: None,
        }
    }

    /// Refresh credentials through `refresher` on `AuthExpired` failures.
    pub fn with_refresher(mut self, refresher: Arc<dyn CredentialRefresher>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    /// Replace the default classifier.
    pub fn with_classifier(mut self, classifier: Arc<dyn FailureClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// The facade-level policy.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Whether `AuthExpired` failures can be recovered.
    pub fn has_refresher(&self) -> bool {
        self.refresher.is_some()
    }

    /// Run `operation` under the facade-level policy.
    pub async fn invoke<F, Fut, T, E>(&self, operation: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: OutboundFailure,
    {
        self.invoke_with(&InvokeOptions::default(), operation).await
    }

    /// Run `operation` with per-call options.
    ///
    /// # Errors
    ///
    /// See [`RetryError`]; every variant that wraps a call failure carries
    /// the last one observed.
    pub async fn invoke_with<F, Fut, T, E>(
        &self,
        options: &InvokeOptions,
        mut operation: F,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: OutboundFailure,
    {
        let config = if options.overrides.is_empty() {
            self.config.as_ref().clone()
        } else {
            self.config
                .merged(&options.overrides)
                .map_err(RetryError::InvalidPolicy)?
        };
        let deadline = config.deadline();
        let backoff = ExponentialBackoff::new(config);
        let classifier: &dyn FailureClassifier = options
            .classifier
            .as_deref()
            .unwrap_or(self.classifier.as_ref());
        let cancellation = options.cancellation.as_ref();

        let mut guard = AuthRefreshGuard::new(self.refresher.clone());
        let mut state = AttemptState::start();

        loop {
            let attempts = state.attempt_number();
            if cancellation.is_some_and(CancellationToken::is_cancelled) {
                return Err(RetryError::Cancelled {
                    attempts: attempts - 1,
                });
            }
            let outcome = match cancellable(cancellation, operation()).await {
                Some(outcome) => outcome,
                None => return Err(RetryError::Cancelled { attempts }),
            };

            let failure = match outcome {
                Ok(value) => {
                    if attempts > 1 {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(attempts, "call succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(failure) => failure,
            };

            let classification = classifier.classify(&failure);
            state.record_failure(classification);

            if classification == ClassifiedFailure::Fatal {
                #[cfg(feature = "tracing")]
                tracing::debug!(attempt = attempts, error = %failure, "fatal failure, not retrying");
                return Err(RetryError::Fatal {
                    attempts,
                    source: failure,
                });
            }

            let next = backoff.next_delay(&state);

            // A refreshed token is only worth fetching if another attempt follows.
            if classification == ClassifiedFailure::AuthExpired
                && (next != Delay::Stop || !guard.can_refresh())
            {
                #[cfg(feature = "tracing")]
                tracing::info!(attempt = attempts, "session expired, refreshing credentials");
                match cancellable(cancellation, guard.on_auth_expired()).await {
                    Some(Ok(_token)) => {}
                    Some(Err(source)) => {
                        #[cfg(feature = "tracing")]
                        tracing::warn!(attempt = attempts, error = %source, "credential refresh failed");
                        return Err(RetryError::AuthUnauthorized { attempts, source });
                    }
                    None => return Err(RetryError::Cancelled { attempts }),
                }
            }

            let delay = match next {
                Delay::Wait(delay) => delay,
                Delay::Stop => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        attempts,
                        max_attempts = backoff.max_attempts(),
                        error = %failure,
                        "retries exhausted"
                    );
                    return Err(RetryError::Exhausted {
                        attempts,
                        source: failure,
                    });
                }
            };

            if let Some(deadline) = deadline {
                let elapsed = state.elapsed_since_first_attempt();
                if elapsed.saturating_add(delay) > deadline {
                    return Err(RetryError::DeadlineExceeded {
                        attempts,
                        elapsed,
                        deadline,
                        source: failure,
                    });
                }
            }

            #[cfg(feature = "tracing")]
            tracing::debug!(
                attempt = attempts,
                max_attempts = backoff.max_attempts(),
                delay_ms = delay.as_millis() as u64,
                classification = %classification,
                error = %failure,
                "retrying after failure"
            );

            if cancellable(cancellation, sleep(delay)).await.is_none() {
                return Err(RetryError::Cancelled { attempts });
            }
            state.advance();
        }
    }
}

impl fmt::Debug for RetryableInvoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryableInvoker")
            .field("config", &self.config)
            .field("has_refresher", &self.refresher.is_some())
            .finish()
    }
}

async fn sleep(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Race `fut` against the cancellation token; `None` means cancelled.
async fn cancellable<Fut>(token: Option<&CancellationToken>, fut: Fut) -> Option<Fut::Output>
where
    Fut: Future,
{
    match token {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => None,
            output = fut => Some(output),
        },
        None => Some(fut.await),
    }
}
