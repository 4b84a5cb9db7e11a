//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Init logging/metrics → Build client → Start monitor
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Broadcast → Monitor and signal tasks exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → graceful shutdown
//!     SIGUSR1/SIGUSR2 → host offline/online events
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
