//! OS signal handling.
//!
//! - SIGINT / SIGTERM: graceful shutdown
//! - SIGUSR1: host went offline (health monitor records it, pauses probing)
//! - SIGUSR2: host is back online (resume and probe immediately)

use tokio::sync::broadcast;

use crate::health::HostNotifier;

/// Wait for Ctrl+C, or SIGTERM on unix.
pub async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("Shutdown signal received");
}

/// Forward SIGUSR1/SIGUSR2 to the health monitor as offline/online events.
#[cfg(unix)]
pub fn spawn_host_signals(notifier: HostNotifier, mut shutdown: broadcast::Receiver<()>) {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut offline, mut online) = match (
        signal(SignalKind::user_defined1()),
        signal(SignalKind::user_defined2()),
    ) {
        (Ok(offline), Ok(online)) => (offline, online),
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!(error = %e, "Failed to install host signal handlers");
            return;
        }
    };

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = offline.recv() => {
                    tracing::info!("SIGUSR1 received, marking host offline");
                    notifier.offline();
                }
                _ = online.recv() => {
                    tracing::info!("SIGUSR2 received, marking host online");
                    notifier.online();
                }
                _ = shutdown.recv() => break,
            }
        }
    });
}

#[cfg(not(unix))]
pub fn spawn_host_signals(_notifier: HostNotifier, _shutdown: broadcast::Receiver<()>) {
    tracing::debug!("Host lifecycle signals are unix-only");
}
