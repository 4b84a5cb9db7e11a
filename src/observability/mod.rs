//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!     → tracing.rs (per-call spans keyed by request ID)
//!
//! Consumers:
//!     → stdout (text or JSON lines)
//!     → Prometheus scrape (monitor binary only)
//! ```

pub mod logging;
pub mod metrics;
pub mod tracing;
