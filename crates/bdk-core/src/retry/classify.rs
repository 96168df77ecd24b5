//! Classify call failures into retry policy categories.

use std::fmt;

/// Shape of a failure returned by an outbound call.
///
/// Implemented by the transport and SDK error types so the classifier can
/// inspect them without knowing their concrete type.
pub trait OutboundFailure: std::error::Error + Send + Sync + 'static {
    /// HTTP status of the response, if a response was received.
    fn status(&self) -> Option<u16>;

    /// Whether the call failed before any response arrived (connection
    /// refused, reset, timeout).
    fn is_transport(&self) -> bool;
}

impl OutboundFailure for std::io::Error {
    fn status(&self) -> Option<u16> {
        None
    }

    fn is_transport(&self) -> bool {
        use std::io::ErrorKind;
        matches!(
            self.kind(),
            ErrorKind::ConnectionRefused
                | ErrorKind::ConnectionReset
                | ErrorKind::ConnectionAborted
                | ErrorKind::NotConnected
                | ErrorKind::BrokenPipe
                | ErrorKind::TimedOut
                | ErrorKind::UnexpectedEof
        )
    }
}

/// Why a failure is worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientCause {
    /// No response was received.
    Network,
    /// The server answered with a transient status (500, 429).
    Server(u16),
}

/// Retry policy category of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifiedFailure {
    /// Wait and try again.
    Retryable(TransientCause),
    /// Refresh credentials before the next attempt.
    AuthExpired,
    /// Propagate immediately.
    Fatal,
}

impl ClassifiedFailure {
    /// Whether the invoker handles this category by looping.
    pub fn is_recoverable(self) -> bool {
        !matches!(self, Self::Fatal)
    }
}

impl fmt::Display for ClassifiedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Retryable(TransientCause::Network) => write!(f, "transient network error"),
            Self::Retryable(TransientCause::Server(status)) => {
                write!(f, "transient server error ({status})")
            }
            Self::AuthExpired => write!(f, "authentication expired"),
            Self::Fatal => write!(f, "fatal"),
        }
    }
}

/// Maps a failure to its [`ClassifiedFailure`].
///
/// Implementations must be pure: classifying the same failure twice yields the
/// same answer. Closures of the right shape implement this trait, which is how
/// call sites plug in their own predicate.
///
/// ```rust
/// use bdk_core::retry::{ClassifiedFailure, FailureClassifier, OutboundFailure};
///
/// // Only retry connection failures.
/// let network_only = |failure: &dyn OutboundFailure| {
///     if failure.is_transport() {
///         ClassifiedFailure::Retryable(bdk_core::retry::TransientCause::Network)
///     } else {
///         ClassifiedFailure::Fatal
///     }
/// };
///
/// let err = std::io::Error::from(std::io::ErrorKind::ConnectionRefused);
/// assert!(network_only.classify(&err).is_recoverable());
/// ```
pub trait FailureClassifier: Send + Sync {
    /// Classify one failure.
    fn classify(&self, failure: &dyn OutboundFailure) -> ClassifiedFailure;
}

impl<F> FailureClassifier for F
where
    F: Fn(&dyn OutboundFailure) -> ClassifiedFailure + Send + Sync,
{
    fn classify(&self, failure: &dyn OutboundFailure) -> ClassifiedFailure {
        self(failure)
    }
}

/// Default status-code based classifier.
///
/// - no response received → `Retryable(Network)`
/// - 500 and 429 → `Retryable(Server)`
/// - 401 → `AuthExpired`
/// - anything else → `Fatal`
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusClassifier;

impl StatusClassifier {
    /// Classify a bare status code.
    pub fn classify_status(status: u16) -> ClassifiedFailure {
        match status {
            500 | 429 => ClassifiedFailure::Retryable(TransientCause::Server(status)),
            401 => ClassifiedFailure::AuthExpired,
            _ => ClassifiedFailure::Fatal,
        }
    }
}

impl FailureClassifier for StatusClassifier {
    fn classify(&self, failure: &dyn OutboundFailure) -> ClassifiedFailure {
        match failure.status() {
            Some(status) => Self::classify_status(status),
            None if failure.is_transport() => ClassifiedFailure::Retryable(TransientCause::Network),
            None => ClassifiedFailure::Fatal,
        }
    }
}
