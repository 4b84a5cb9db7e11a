//! Exponential backoff.

use std::time::Duration;

/// Delay to wait before issuing `attempt` (1-based).
///
/// `base × 2^(attempt-1)`, no jitter, saturating on overflow. The first
/// attempt is never delayed by the retry loop, so in practice the waits are
/// `2 × base` before attempt 2 and `4 × base` before attempt 3.
pub fn calculate_backoff(attempt: u32, base: Duration) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let exponential = 2u32.saturating_pow(attempt - 1);
    base.saturating_mul(exponential)
}
