//! linkpulse Binary Entry Point
//!
//! Runs the connectivity-liveness monitor against a single target.
//! Core functionality is provided by the `linkpulse` library crate.

use clap::Parser;
use linkpulse::{
    AlwaysUp, AppConfig, IcmpTransport, LogAlertSink, LogEventSink, Monitor, MonitorConfig,
    MonitorDriver, REPLY_CHANNEL_CAPACITY,
};
use tokio::sync::{mpsc, watch};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// linkpulse - Connectivity-Liveness Monitor
#[derive(Parser, Debug)]
#[command(name = "linkpulse", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "LINKPULSE_CONFIG")]
    config: Option<String>,

    /// Target IP address (overrides config file)
    #[arg(long, env = "LINKPULSE_TARGET")]
    target: Option<String>,

    /// Failure threshold (overrides config file)
    #[arg(long, env = "LINKPULSE_THRESHOLD")]
    threshold: Option<u32>,

    /// Polling interval, e.g. "10s" (overrides config file)
    #[arg(long, env = "LINKPULSE_INTERVAL")]
    interval: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,linkpulse=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("linkpulse - Connectivity-Liveness Monitor");

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration from file, or start from defaults when only a
    // target is given on the command line
    let mut config = match (&cli.config, &cli.target) {
        (Some(path), _) => {
            tracing::info!("Loading configuration from: {}", path);
            AppConfig::load(path)?
        }
        (None, Some(target)) => AppConfig {
            monitor: MonitorConfig::new(target.clone()),
        },
        (None, None) => {
            return Err("either --config or --target is required".into());
        }
    };

    // Apply CLI/env overrides (CLI > ENV > config file)
    if let Some(target) = cli.target {
        config.monitor.target = target;
    }
    if let Some(threshold) = cli.threshold {
        config.monitor.threshold = threshold;
    }
    if let Some(interval) = cli.interval {
        config.monitor.interval = humantime::parse_duration(&interval)?;
    }

    // Invalid configuration is fatal: an unmonitorable target is worse
    // than an explicit failure
    config.validate()?;

    tracing::info!(
        "Target: {}, threshold: {} failures, interval: {}, timeout: {}",
        config.monitor.target,
        config.monitor.threshold,
        humantime::format_duration(config.monitor.effective_interval()),
        humantime::format_duration(config.monitor.timeout),
    );

    // Wire the monitor to the ICMP transport through the reply channel
    let (reply_tx, reply_rx) = mpsc::channel(REPLY_CHANNEL_CAPACITY);
    let monitor = Monitor::from_config(&config.monitor, LogAlertSink::new(), LogEventSink)?;
    let driver = MonitorDriver::new(
        monitor,
        IcmpTransport::new(reply_tx),
        AlwaysUp,
        reply_rx,
        &config.monitor,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let driver_handle = tokio::spawn(driver.run(shutdown_rx));

    tracing::info!("Press Ctrl+C to shutdown");
    shutdown_signal().await;

    // Graceful shutdown
    let _ = shutdown_tx.send(true);
    driver_handle.await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
