//! Connection status shared by the client and the health monitor.
//!
//! # State
//! - `is_online`: last known reachability of the backend
//! - `db_connected`: last known state of the backend's database
//! - `consecutive_failures`: classified failures since the last success
//! - `last_health_check`: when a probe last completed (either way)
//!
//! # Design Decisions
//! - One instance per client, injected through `Arc`, never a global
//! - Fields are updated independently; concurrent calls may interleave
//! - The failure count saturates at both ends

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

/// Live connection status.
#[derive(Debug)]
pub struct ConnectionStatus {
    online: AtomicBool,
    db_connected: AtomicBool,
    consecutive_failures: AtomicU32,
    last_health_check: Mutex<Option<Instant>>,
}

/// Read-only copy of the connection status.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionSnapshot {
    pub is_online: bool,
    pub db_connected: bool,
    pub consecutive_failures: u32,
    pub last_health_check_age_secs: Option<u64>,
    #[serde(skip)]
    pub last_health_check: Option<Instant>,
}

impl ConnectionStatus {
    pub fn new() -> Self {
        Self {
            online: AtomicBool::new(true),
            db_connected: AtomicBool::new(true),
            consecutive_failures: AtomicU32::new(0),
            last_health_check: Mutex::new(None),
        }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }

    pub fn set_online(&self, online: bool) {
        let was = self.online.swap(online, Ordering::Relaxed);
        if was != online {
            tracing::info!(online, "Connection state changed");
        }
    }

    pub fn is_db_connected(&self) -> bool {
        self.db_connected.load(Ordering::Relaxed)
    }

    pub fn set_db_connected(&self, connected: bool) {
        let was = self.db_connected.swap(connected, Ordering::Relaxed);
        if was != connected {
            tracing::info!(db_connected = connected, "Database state changed");
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::Relaxed)
    }

    /// A request attempt succeeded.
    pub fn record_success(&self) {
        self.consecutive_failures.store(0, Ordering::Relaxed);
        self.set_online(true);
    }

    /// A call failed after classification. Returns the new count.
    pub fn record_failure(&self) -> u32 {
        let previous = self
            .consecutive_failures
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                Some(n.saturating_add(1))
            })
            .unwrap_or_else(|n| n);
        previous.saturating_add(1)
    }

    /// A probe reached the backend and reported the database state.
    pub fn record_health_check(&self, db_connected: bool) {
        self.set_online(true);
        self.set_db_connected(db_connected);
        self.touch_health_check();
    }

    /// A probe completed, successfully or not.
    pub fn touch_health_check(&self) {
        *self
            .last_health_check
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
    }

    /// The backend confirmed a database reconnect.
    pub fn record_reconnect(&self) {
        self.consecutive_failures.store(0, Ordering::Relaxed);
        self.set_db_connected(true);
    }

    /// Time since the last probe, `None` if there never was one.
    pub fn since_last_check(&self) -> Option<Duration> {
        self.last_health_check
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .map(|at| at.elapsed())
    }

    pub fn snapshot(&self) -> ConnectionSnapshot {
        let last_health_check = *self
            .last_health_check
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        ConnectionSnapshot {
            is_online: self.is_online(),
            db_connected: self.is_db_connected(),
            consecutive_failures: self.consecutive_failures(),
            last_health_check_age_secs: last_health_check.map(|at| at.elapsed().as_secs()),
            last_health_check,
        }
    }
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self::new()
    }
}
