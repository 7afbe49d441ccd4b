//! Retry with an increasing per-attempt timeout.
//!
//! Every remote call (availability lookup, booking submission, persona
//! reasoning) goes through [`retry_with_backoff`]. Attempt `n` is given a
//! timeout of `base_timeout + timeout_step * (n - 1)`, so a slow service gets
//! more room on each try instead of failing fast.

use std::future::Future;
use std::time::Duration;

use crate::error::{LlmError, TransportError};

/// How many times to try a remote call and how long each try may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Timeout for the first attempt.
    pub base_timeout: Duration,
    /// Added to the timeout for each subsequent attempt.
    pub timeout_step: Duration,
    /// Pause before attempt `n + 1` is `backoff * n`.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_timeout: Duration::from_secs(10),
            timeout_step: Duration::from_secs(5),
            backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Timeout granted to the given 1-based attempt.
    pub fn timeout_for(&self, attempt: u32) -> Duration {
        self.base_timeout + self.timeout_step * attempt.saturating_sub(1)
    }

    /// A policy with no pauses between attempts.
    pub fn without_backoff(mut self) -> Self {
        self.backoff = Duration::ZERO;
        self
    }
}

/// Errors the retry helper knows how to classify.
pub trait Transient: std::fmt::Display {
    /// Whether another attempt might succeed.
    fn is_transient(&self) -> bool;

    /// The error to report when an attempt overruns its timeout.
    fn timed_out(endpoint: &str, timeout: Duration) -> Self;
}

impl Transient for TransportError {
    fn is_transient(&self) -> bool {
        true
    }

    fn timed_out(endpoint: &str, timeout: Duration) -> Self {
        TransportError::Timeout {
            endpoint: endpoint.to_string(),
            timeout,
        }
    }
}

impl Transient for LlmError {
    fn is_transient(&self) -> bool {
        matches!(self, LlmError::Transport(_) | LlmError::RequestFailed { .. })
    }

    fn timed_out(endpoint: &str, timeout: Duration) -> Self {
        LlmError::Transport(TransportError::timed_out(endpoint, timeout))
    }
}

/// Run `op` until it succeeds, fails permanently, or runs out of attempts.
///
/// `op` receives the timeout for the current attempt so it can pass it on to
/// its HTTP client; the helper also enforces it with `tokio::time::timeout`.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    endpoint: &str,
    mut op: F,
) -> Result<T, E>
where
    E: Transient,
    F: FnMut(Duration) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let timeout = policy.timeout_for(attempt);
        let result = match tokio::time::timeout(timeout, op(timeout)).await {
            Ok(result) => result,
            Err(_) => Err(E::timed_out(endpoint, timeout)),
        };

        match result {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(endpoint, attempt, "Remote call succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if e.is_transient() && attempt < max_attempts => {
                tracing::warn!(
                    endpoint,
                    attempt,
                    timeout_ms = timeout.as_millis() as u64,
                    error = %e,
                    "Remote call failed, retrying"
                );
                let pause = policy.backoff * attempt;
                if !pause.is_zero() {
                    tokio::time::sleep(pause).await;
                }
                attempt += 1;
            }
            Err(e) => {
                if e.is_transient() {
                    tracing::error!(
                        endpoint,
                        attempts = attempt,
                        error = %e,
                        "Remote call failed on every attempt"
                    );
                }
                return Err(e);
            }
        }
    }
}
