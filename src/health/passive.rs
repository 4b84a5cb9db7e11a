//! Passive health tracking.
//!
//! # Responsibilities
//! - Apply the effects of a classified failure to the connection status
//! - Keep the connection gauges current
//!
//! # Design Decisions
//! - Unauthorized responses never count as failures
//! - Any other error response leaves the count alone; the backend answered

use crate::health::state::ConnectionStatus;
use crate::observability::metrics;
use crate::resilience::Effects;

/// Apply classification effects to `status`.
pub fn apply_effects(status: &ConnectionStatus, effects: &Effects) {
    if effects.count_failure {
        let failures = status.record_failure();
        tracing::debug!(consecutive_failures = failures, "Failure recorded");
    }
    if effects.mark_db_down {
        status.set_db_connected(false);
    }
    if effects.mark_offline {
        status.set_online(false);
    }
    metrics::record_connection_status(&status.snapshot());
}
