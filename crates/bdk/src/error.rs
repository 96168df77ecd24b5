//! Error types for the BDK SDK
//!
//! Every SDK call returns [`Error`]. Failures that went through the retry
//! layer are flattened from [`RetryError`] so callers match on one enum.

use bdk_core::error::UNAUTHORIZED_MESSAGE;
use bdk_core::retry::OutboundFailure;
use bdk_core::{AuthError, ConfigError, RetryError};
use bdk_transport::TransportError;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for operations that can fail with a BDK error.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the BDK SDK.
#[derive(Debug, Error)]
pub enum Error {
    /// The server answered with a non-2xx status.
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body, or the reason phrase when empty
        message: String,
    },

    /// The bot could not authenticate or re-authenticate.
    #[error("{message}")]
    AuthUnauthorized {
        /// Human readable description
        message: String,
        /// Why the credentials could not be refreshed, when known
        #[source]
        source: Option<AuthError>,
    },

    /// No response was received, or the transport could not be set up.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Every allowed attempt failed with a recoverable error.
    #[error("retries exhausted after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Attempts made
        attempts: u32,
        /// The last failure
        #[source]
        source: Box<Error>,
    },

    /// The overall retry deadline would have been overrun.
    #[error("retry deadline exceeded after {attempts} attempts ({elapsed:?} elapsed): {source}")]
    DeadlineExceeded {
        /// Attempts made
        attempts: u32,
        /// Time spent since the first attempt
        elapsed: Duration,
        /// The last failure
        #[source]
        source: Box<Error>,
    },

    /// The call was cancelled by the caller.
    #[error("request cancelled after {0} attempt(s)")]
    Cancelled(u32),

    /// Retry parameters are out of range.
    #[error("Invalid retry configuration: {0}")]
    InvalidRetryConfig(#[from] ConfigError),

    /// Configuration could not be loaded or is incomplete.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to deserialize a response body.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The standard "service account not authorized" error.
    pub fn unauthorized() -> Self {
        Self::AuthUnauthorized {
            message: UNAUTHORIZED_MESSAGE.to_string(),
            source: None,
        }
    }

    /// Build an API error from a response status and body.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = if body.trim().is_empty() {
            format!("HTTP {status}")
        } else {
            body.to_string()
        };
        Self::Api { status, message }
    }

    /// HTTP status of the last server answer, looking through retry
    /// wrappers. [`OutboundFailure::status`] only reports a direct `Api`
    /// error.
    pub fn last_status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::RetriesExhausted { source, .. } | Self::DeadlineExceeded { source, .. } => {
                source.last_status()
            }
            _ => None,
        }
    }

    /// Whether the bot credentials were rejected.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::AuthUnauthorized { .. })
    }
}

impl OutboundFailure for Error {
    fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(err) if err.is_connection_failure())
    }
}

impl From<RetryError<Error>> for Error {
    fn from(err: RetryError<Error>) -> Self {
        match err {
            RetryError::Fatal { source, .. } => source,
            RetryError::AuthUnauthorized { source, .. } => Self::AuthUnauthorized {
                message: UNAUTHORIZED_MESSAGE.to_string(),
                source: Some(source),
            },
            RetryError::Exhausted { attempts, source } => Self::RetriesExhausted {
                attempts,
                source: Box::new(source),
            },
            RetryError::DeadlineExceeded {
                attempts,
                elapsed,
                source,
                ..
            } => Self::DeadlineExceeded {
                attempts,
                elapsed,
                source: Box::new(source),
            },
            RetryError::Cancelled { attempts } => Self::Cancelled(attempts),
            RetryError::InvalidPolicy(err) => Self::InvalidRetryConfig(err),
        }
    }
}
