//! Health tracking subsystem.
//!
//! # Data Flow
//! ```text
//! Passive tracking (passive.rs):
//!     Classified request failure / success
//!     → update state.rs counters and flags
//!
//! Active probing (active.rs):
//!     /health, /db-health, /db-reconnect
//!     → update state.rs
//!
//! Background monitor (monitor.rs):
//!     Periodic timer + host lifecycle events
//!     → active.rs, only when degraded or stale
//! ```
//!
//! # Design Decisions
//! - Active and passive tracking are complementary
//! - Status is owned by the client and shared by `Arc`, never global
//! - Probe failures never propagate to callers

pub mod active;
pub mod monitor;
pub mod passive;
pub mod state;

pub use active::{DatabaseHealth, HealthChecker, SystemHealth};
pub use monitor::{needs_probe, HealthMonitor, HostEvent, HostNotifier, MonitorHandle};
pub use state::{ConnectionSnapshot, ConnectionStatus};
