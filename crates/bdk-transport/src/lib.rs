//! HTTP transport layer for the BDK client SDK
//!
//! Provides a trait-based transport abstraction used by the API clients to
//! reach the pod, agent, key manager and session authentication endpoints.
//!
//! # Architecture
//!
//! - **Transport trait**: Generic interface for any transport implementation
//! - **HTTP transport**: reqwest client with proxy and TLS configuration
//! - **Error handling**: [`TransportError`] implements
//!   [`bdk_core::retry::OutboundFailure`] so connection failures are retried
//!
//! # Usage
//!
//! ```ignore
//! use bdk_transport::{Transport, HttpTransport, HttpRequest};
//!
//! let transport = HttpTransport::new()?;
//! let request = HttpRequest::new("GET", "https://acme.symphony.com/pod/v2/sessioninfo");
//! let response = transport.send_http(request).await?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod http;
pub mod traits;

// Re-export commonly used types
pub use error::{Result, TransportError};
pub use http::{HttpTransport, HttpTransportConfig, ProxyConfig};
pub use traits::{HttpRequest, HttpResponse, Transport};
