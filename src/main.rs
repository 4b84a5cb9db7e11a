//! Hospital backend health monitor (v1)
//!
//! Long-running companion process for the API client.
//!
//! # Architecture Overview
//!
//! ```text
//!      SIGUSR1 / SIGUSR2                     Ctrl+C / SIGTERM
//!            │                                      │
//!            ▼                                      ▼
//!   ┌─────────────────┐   host events    ┌──────────────────┐
//!   │ lifecycle       │─────────────────▶│ health monitor   │
//!   │ signals         │                  │ (periodic probe) │
//!   └─────────────────┘                  └────────┬─────────┘
//!                                                 │
//!                                                 ▼
//!   ┌─────────────────┐   snapshot       ┌──────────────────┐     /health
//!   │ metrics export  │◀─────────────────│ ApiClient        │──▶  /db-health
//!   │ (Prometheus)    │                  │ connection state │     /db-reconnect
//!   └─────────────────┘                  └──────────────────┘
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use hospital_client::health::HealthMonitor;
use hospital_client::lifecycle::{signals, startup, Shutdown};
use hospital_client::observability::{logging, metrics};
use hospital_client::ApiClient;

#[derive(Parser)]
#[command(name = "hospital-client")]
#[command(about = "Connection health monitor for the hospital backend", long_about = None)]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = startup::resolve_config(args.config.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!("hospital-client v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let client = ApiClient::from_config(&config)?;

    tracing::info!(
        max_attempts = config.retries.max_attempts,
        base_delay_ms = config.retries.base_delay_ms,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let health = client.check_system_health().await;
    tracing::info!(
        system = health.system,
        database = health.database,
        "Initial health check"
    );
    metrics::record_connection_status(&client.status());

    let shutdown = Shutdown::new();

    let monitor = if config.health_check.enabled {
        let handle = HealthMonitor::new(client.health().clone(), config.health_check.clone())
            .start(shutdown.subscribe());
        signals::spawn_host_signals(handle.notifier(), shutdown.subscribe());
        Some(handle)
    } else {
        tracing::warn!("Health monitoring disabled");
        None
    };

    // Mirror the connection state into the gauges between probes
    let reporter = {
        let client = client.clone();
        let mut stop = shutdown.subscribe();
        let period = Duration::from_secs(config.health_check.interval_secs.max(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = ticker.tick() => metrics::record_connection_status(&client.status()),
                    _ = stop.recv() => break,
                }
            }
        })
    };

    signals::wait_for_shutdown().await;
    shutdown.trigger();

    if let Some(handle) = monitor {
        handle.stop().await;
    }
    let _ = reporter.await;

    tracing::info!(status = ?client.status(), "Shutdown complete");
    Ok(())
}
