//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to backend:
//!     → retries.rs (attempt, check if retryable, wait backoff.rs delay, repeat)
//!     → classifier.rs (map the final failure to an ApiError + side effects)
//!     → http::client applies the effects to the connection status / session
//! ```
//!
//! # Design Decisions
//! - Every call carries a deadline set by the transport
//! - Retries are an explicit loop; each call owns its attempt counter
//! - Classification is pure so it can be tested without a client

pub mod backoff;
pub mod classifier;
pub mod retries;

pub use classifier::{classify, Classification, Effects};
pub use retries::{run_with_retries, Failure, RequestAttempt, RetryPolicy};
