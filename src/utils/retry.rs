//! Bounded retry for the citation fetch.
//!
//! A lookup makes one attempt by default and at most one extra attempt when
//! configured to. Only transient failures are retried.

use std::time::Duration;
use tokio::time::sleep;

use crate::lookup::LookupError;

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the next attempt
    pub delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::from_millis(500),
        }
    }
}

impl RetryConfig {
    /// Set the total number of attempts
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Set the delay between attempts
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Transient errors that may succeed on a second attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientError {
    /// Connection-level failure
    Network,
    /// Request timed out
    Timeout,
    /// Server error (5xx) or 429
    ServerError(u16),
}

impl TransientError {
    /// Classify a lookup error; `None` means retrying cannot help
    pub fn from_lookup_error(err: &LookupError) -> Option<Self> {
        match err {
            LookupError::Network(_) => Some(TransientError::Network),
            LookupError::Timeout => Some(TransientError::Timeout),
            LookupError::Status(code) if *code == 429 || *code >= 500 => {
                Some(TransientError::ServerError(*code))
            }
            _ => None,
        }
    }
}

/// Execute an async operation, retrying transient failures
pub async fn with_retry<T, F, Fut>(config: RetryConfig, mut operation: F) -> Result<T, LookupError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, LookupError>>,
{
    let mut attempts = 0;

    loop {
        attempts += 1;

        match operation().await {
            Ok(result) => {
                if attempts > 1 {
                    tracing::info!("Fetch succeeded on attempt {}", attempts);
                }
                return Ok(result);
            }
            Err(error) => {
                let Some(transient) = TransientError::from_lookup_error(&error) else {
                    return Err(error);
                };

                if attempts >= config.max_attempts {
                    return Err(error);
                }

                tracing::debug!(
                    "Transient error on attempt {}: {:?}, retrying in {:?}",
                    attempts,
                    transient,
                    config.delay
                );
                sleep(config.delay).await;
            }
        }
    }
}
