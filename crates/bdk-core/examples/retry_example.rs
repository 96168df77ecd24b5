//! Example: wrapping a flaky call with `RetryableInvoker`
//!
//! This example demonstrates:
//! 1. Transient server errors retried with exponential backoff
//! 2. An expired session refreshed before the next attempt
//! 3. A fatal status propagated on the first attempt
//!
//! Run with:
//! ```bash
//! cargo run -p bdk-core --example retry_example
//! ```

use async_trait::async_trait;
use bdk_core::prelude::*;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

/// Failure returned by the simulated API.
#[derive(Debug)]
struct ApiFailure(u16);

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.0)
    }
}

impl std::error::Error for ApiFailure {}

impl OutboundFailure for ApiFailure {
    fn status(&self) -> Option<u16> {
        Some(self.0)
    }

    fn is_transport(&self) -> bool {
        false
    }
}

/// A simulated API answering with a scripted list of statuses.
struct ScriptedApi {
    attempts: AtomicU32,
    script: Vec<u16>,
}

impl ScriptedApi {
    fn new(script: Vec<u16>) -> Self {
        Self {
            attempts: AtomicU32::new(0),
            script,
        }
    }

    async fn call(&self) -> Result<String, ApiFailure> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) as usize;
        match self.script.get(attempt) {
            Some(200) | None => {
                println!("  Attempt {}: SUCCESS", attempt + 1);
                Ok("session info".to_string())
            }
            Some(&status) => {
                println!("  Attempt {}: FAILED with {}", attempt + 1, status);
                Err(ApiFailure(status))
            }
        }
    }
}

struct PrintingRefresher;

#[async_trait]
impl CredentialRefresher for PrintingRefresher {
    async fn refresh_credentials(&self) -> Result<Token, AuthError> {
        println!("  -> refreshing session token");
        Ok(Token::new("fresh-session-token"))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = RetryConfig::builder()
        .max_attempts(4)
        .initial_interval(Duration::from_millis(100))
        .max_interval(Duration::from_secs(1))
        .build()?;
    let invoker = RetryableInvoker::new(config).with_refresher(Arc::new(PrintingRefresher));

    println!("=== Example 1: transient server errors ===\n");
    let api = ScriptedApi::new(vec![500, 429, 200]);
    let start = Instant::now();
    let result = invoker.invoke(|| api.call()).await?;
    println!("Result: {} after {:?}\n", result, start.elapsed());

    println!("=== Example 2: expired session ===\n");
    let api = ScriptedApi::new(vec![401, 200]);
    let result = invoker.invoke(|| api.call()).await?;
    println!("Result: {}\n", result);

    println!("=== Example 3: fatal status ===\n");
    let api = ScriptedApi::new(vec![403]);
    match invoker.invoke(|| api.call()).await {
        Ok(_) => println!("unexpected success"),
        Err(err) => println!("Error after {} attempt(s): {}", err.attempts(), err),
    }

    Ok(())
}
