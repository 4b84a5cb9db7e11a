//! Background health monitor.
//!
//! # Responsibilities
//! - Periodically probe `/health` while the client is degraded or the last
//!   check is stale
//! - React to host lifecycle signals (hidden/visible, online/offline)
//!
//! # Design Decisions
//! - The host drives lifecycle through `MonitorHandle`; nothing here knows
//!   about windows, tabs or OS signals
//! - Hidden or offline pauses ticking; visible or online resumes and probes
//!   immediately
//! - Offline is recorded without a network round trip

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::HealthCheckConfig;
use crate::health::active::HealthChecker;
use crate::health::state::ConnectionStatus;
use crate::http::Transport;

/// Lifecycle signals from the host environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    Hidden,
    Visible,
    Online,
    Offline,
}

#[derive(Debug)]
enum Command {
    Host(HostEvent),
    Stop,
}

/// Decide whether a background tick should probe.
pub fn needs_probe(
    consecutive_failures: u32,
    since_last_check: Option<Duration>,
    stale_after: Duration,
) -> bool {
    consecutive_failures > 0 || since_last_check.map_or(true, |age| age > stale_after)
}

/// Periodic prober.
pub struct HealthMonitor<T> {
    checker: HealthChecker<T>,
    config: HealthCheckConfig,
}

impl<T: Transport> HealthMonitor<T> {
    pub fn new(checker: HealthChecker<T>, config: HealthCheckConfig) -> Self {
        Self { checker, config }
    }

    /// Spawn the monitor loop.
    ///
    /// The loop exits on [`MonitorHandle::stop`] or when `shutdown` fires.
    pub fn start(self, shutdown: broadcast::Receiver<()>) -> MonitorHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(self.run(rx, shutdown));
        MonitorHandle {
            notifier: HostNotifier { tx },
            task,
        }
    }

    async fn run(self, mut commands: mpsc::UnboundedReceiver<Command>, mut shutdown: broadcast::Receiver<()>) {
        let interval = Duration::from_secs(self.config.interval_secs.max(1));
        let stale_after = Duration::from_secs(self.config.stale_after_secs);
        let status: Arc<ConnectionStatus> = self.checker.status().clone();

        tracing::info!(
            interval_secs = interval.as_secs(),
            stale_after_secs = stale_after.as_secs(),
            "Health monitor starting"
        );

        let mut ticker = time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut paused = false;

        loop {
            tokio::select! {
                _ = ticker.tick(), if !paused => {
                    if needs_probe(status.consecutive_failures(), status.since_last_check(), stale_after) {
                        self.checker.check_system_health().await;
                    } else {
                        tracing::trace!("Connection healthy and recently checked, skipping probe");
                    }
                }
                command = commands.recv() => match command {
                    Some(Command::Host(HostEvent::Hidden)) => {
                        tracing::debug!("Host hidden, pausing health probes");
                        paused = true;
                    }
                    Some(Command::Host(HostEvent::Offline)) => {
                        tracing::info!("Host went offline, pausing health probes");
                        status.set_online(false);
                        paused = true;
                    }
                    Some(Command::Host(event @ (HostEvent::Visible | HostEvent::Online))) => {
                        tracing::debug!(?event, "Resuming health probes");
                        paused = false;
                        ticker.reset();
                        self.checker.check_system_health().await;
                    }
                    Some(Command::Stop) | None => break,
                },
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }

        tracing::info!("Health monitor stopped");
    }
}

/// Cloneable sender for host lifecycle events.
#[derive(Debug, Clone)]
pub struct HostNotifier {
    tx: mpsc::UnboundedSender<Command>,
}

impl HostNotifier {
    pub fn notify(&self, event: HostEvent) {
        if self.tx.send(Command::Host(event)).is_err() {
            tracing::debug!(?event, "Health monitor already stopped");
        }
    }

    pub fn hidden(&self) {
        self.notify(HostEvent::Hidden);
    }

    pub fn visible(&self) {
        self.notify(HostEvent::Visible);
    }

    pub fn online(&self) {
        self.notify(HostEvent::Online);
    }

    pub fn offline(&self) {
        self.notify(HostEvent::Offline);
    }
}

/// Handle to a running monitor.
#[derive(Debug)]
pub struct MonitorHandle {
    notifier: HostNotifier,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    pub fn notifier(&self) -> HostNotifier {
        self.notifier.clone()
    }

    pub fn hidden(&self) {
        self.notifier.hidden();
    }

    pub fn visible(&self) {
        self.notifier.visible();
    }

    pub fn online(&self) {
        self.notifier.online();
    }

    pub fn offline(&self) {
        self.notifier.offline();
    }

    /// Stop the loop and wait for it to exit.
    pub async fn stop(self) {
        let _ = self.notifier.tx.send(Command::Stop);
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Health monitor task failed");
        }
    }
}
