//! Retry logic.
//!
//! # Responsibilities
//! - Determine whether a failed attempt is retryable
//! - Re-issue the call with exponential backoff
//! - Keep the connection status in step with successful attempts
//!
//! # State Machine
//! ```text
//! ATTEMPT(n) → success                                   → DONE
//!            → failure, retryable, n < max_attempts      → WAIT(backoff(n+1)) → ATTEMPT(n+1)
//!            → failure, not retryable or n == max        → FAILED
//! ```

use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::config::RetryConfig;
use crate::health::ConnectionStatus;
use crate::http::{ApiResponse, TransportError, TransportErrorKind};
use crate::observability::metrics;
use crate::resilience::backoff::calculate_backoff;

/// A failed attempt, before classification.
#[derive(Debug, Clone)]
pub enum Failure {
    /// No response arrived.
    Transport(TransportError),
    /// The backend answered with a non-2xx status.
    Response(ApiResponse),
}

/// Immutable retry settings.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub retryable_statuses: HashSet<u16>,
    pub retryable_transport_errors: HashSet<TransportErrorKind>,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            retryable_statuses: config.retryable_statuses.iter().copied().collect(),
            retryable_transport_errors: config.retryable_transport_errors.iter().copied().collect(),
        }
    }

    /// Check if a failure is worth another attempt.
    pub fn is_retryable(&self, failure: &Failure) -> bool {
        match failure {
            Failure::Transport(e) => self.retryable_transport_errors.contains(&e.kind),
            Failure::Response(r) => self.retryable_statuses.contains(&r.status),
        }
    }

    /// Delay before issuing `attempt`.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        calculate_backoff(attempt, self.base_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

/// Bookkeeping for one logical call across its retries.
#[derive(Debug, Clone, Copy)]
pub struct RequestAttempt {
    /// 1-based attempt number.
    pub number: u32,
    /// When the logical call started.
    pub started_at: Instant,
}

impl RequestAttempt {
    pub fn first() -> Self {
        Self {
            number: 1,
            started_at: Instant::now(),
        }
    }

    /// Time since the logical call started, retries and waits included.
    pub fn call_elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn next(self) -> Self {
        Self {
            number: self.number + 1,
            started_at: self.started_at,
        }
    }
}

/// Run `send` until it succeeds, fails terminally or exhausts the policy.
///
/// Every successful attempt resets the failure count and marks the client
/// online. The final failure is returned unclassified.
pub async fn run_with_retries<F, Fut>(
    policy: &RetryPolicy,
    status: &ConnectionStatus,
    mut send: F,
) -> Result<ApiResponse, Failure>
where
    F: FnMut(RequestAttempt) -> Fut,
    Fut: Future<Output = Result<ApiResponse, TransportError>>,
{
    let mut attempt = RequestAttempt::first();

    loop {
        let failure = match send(attempt).await {
            Ok(response) if response.is_success() => {
                status.record_success();
                return Ok(response);
            }
            Ok(response) => Failure::Response(response),
            Err(e) => Failure::Transport(e),
        };

        if attempt.number >= policy.max_attempts || !policy.is_retryable(&failure) {
            return Err(failure);
        }

        let delay = policy.delay_before(attempt.number + 1);
        let reason = match &failure {
            Failure::Response(r) => r.status.to_string(),
            Failure::Transport(e) => e.kind.as_str().to_string(),
        };
        tracing::info!(
            attempt = attempt.number,
            delay_ms = delay.as_millis() as u64,
            reason = %reason,
            "Retrying request"
        );
        metrics::record_retry(&reason);

        tokio::time::sleep(delay).await;
        attempt = attempt.next();
    }
}
