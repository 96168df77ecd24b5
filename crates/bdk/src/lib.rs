//! # BDK
//!
//! Rust client SDK for the Symphony enterprise messaging platform:
//! - Configuration from YAML or JSON files
//! - Certificate authentication of a bot service account
//! - Automatic retries with exponential backoff
//! - Transparent session refresh when a token expires
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bdk::{Bdk, BdkConfigLoader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BdkConfigLoader::load_from_file("config.yaml")?;
//!     let bdk = Bdk::new(config)?;
//!
//!     let session = bdk.sessions().get_session().await?;
//!     println!("{} ({})", session.display_name, session.id);
//!     Ok(())
//! }
//! ```
//!
//! ## Retries
//!
//! Every service call goes through [`Bdk::invoker`]. Network errors, 500 and
//! 429 are retried; a 401 triggers re-authentication of the bot before the
//! next attempt; anything else fails immediately. Per-call overrides are
//! available through the `*_with` service methods.

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Re-export commonly used types
pub use client::Bdk;
pub use config::{BdkConfig, BdkConfigLoader};
pub use error::{Error, Result};

// Module declarations
pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod observability;
pub mod services;

// Re-export the retry layer for per-call overrides and custom invocations
pub use bdk_core::retry;

/// Prelude module for common imports
///
/// # Examples
///
/// ```rust
/// use bdk::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Bdk, BdkConfig, BdkConfigLoader, Error, Result,
        auth::{AuthSession, BotAuthenticator},
        retry::{RetryConfig, RetryOverrides, RetryableInvoker},
        services::{SessionService, UserSession},
    };
}

/// SDK version, automatically updated from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
