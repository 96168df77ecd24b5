//! Transport error types

use bdk_core::retry::OutboundFailure;
use thiserror::Error;

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors that can occur in transport operations
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request/response error after a connection was made
    #[error("HTTP error: {0}")]
    Http(String),

    /// Connection could not be established or was dropped
    #[error("Connection error: {0}")]
    Connection(String),

    /// I/O error (reading certificates, trust stores)
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    /// Request timeout
    #[error("Timeout")]
    Timeout,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid transport configuration (proxy, TLS material, method)
    #[error("Invalid transport configuration: {0}")]
    Config(String),
}

impl TransportError {
    /// Whether no response was received.
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout)
    }

    /// Map a failure from sending a request, before any status arrived.
    ///
    /// Refused, reset and half-closed connections all end up here, so
    /// everything except timeouts and builder errors is a `Connection`.
    pub fn from_send(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_builder() {
            Self::Config(err.to_string())
        } else {
            Self::Connection(err.to_string())
        }
    }
}

impl OutboundFailure for TransportError {
    fn status(&self) -> Option<u16> {
        None
    }

    fn is_transport(&self) -> bool {
        self.is_connection_failure()
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() || err.is_request() {
            Self::Connection(err.to_string())
        } else if err.is_builder() {
            Self::Config(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
