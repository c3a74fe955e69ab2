//! Retry with exponential backoff
//!
//! Remote calls made by the engine go through a [`RetryPolicy`]. Adapters
//! classify their failures with a [`RemoteCallError`]; the policy repeats a
//! call only when that classification allows it for the kind of call, with
//! a delay that doubles after every attempt. Unclassified errors fail
//! immediately. HTTP 429 is handled by the transport and reaches this layer
//! as a permanent failure.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn};

use projsync_core::config::RemoteConfig;
use projsync_core::domain::errors::RemoteCallError;

/// What repeating a call would do on the remote side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// Repeating has no further effect (list, delete)
    Idempotent,
    /// Repeating may create a duplicate (create project, upload)
    Mutating,
}

/// Default maximum number of retries for transient errors
const MAX_RETRIES: u32 = 5;

/// Default base delay for exponential backoff
const BASE_DELAY: Duration = Duration::from_secs(1);

/// How many times, and how patiently, a failed remote call is retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each following one
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            base_delay: BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &RemoteConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.initial_backoff_ms),
        }
    }

    /// Delay before retry number `attempt` (zero-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Executes an async operation, retrying failures its kind allows
    ///
    /// Other errors, and the last retryable error once retries are
    /// exhausted, are returned unchanged.
    pub async fn run<F, Fut, T>(&self, operation_name: &str, kind: CallKind, f: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match f().await {
                Ok(value) => {
                    if attempt > 0 {
                        info!(
                            operation = operation_name,
                            attempt, "Operation succeeded after retry"
                        );
                    }
                    return Ok(value);
                }
                Err(err) if attempt < self.max_retries && should_retry(&err, kind) => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        operation = operation_name,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Transient error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Whether a call of `kind` that failed with `err` may be sent again
pub fn should_retry(err: &anyhow::Error, kind: CallKind) -> bool {
    RemoteCallError::transience_of(err).allows_retry(kind == CallKind::Idempotent)
}
