//! messaging-health
//!
//! Runs the configured Azure messaging health checks on an interval and
//! serves the latest report over HTTP.
//!
//! ```text
//!   config.toml ─▶ startup ─▶ HealthCheckService ─▶ HealthMonitor ─▶ LatestReport
//!                                    │                                   │
//!                                    └──── GET /health/{tag}   GET /health
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use messaging_health::config::load_config;
use messaging_health::health::{HealthMonitor, LatestReport, ProbeClients};
use messaging_health::http::HealthServer;
use messaging_health::lifecycle::{signals, startup, Shutdown};
use messaging_health::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "messaging-health")]
#[command(about = "Health checks for Azure Event Hubs and Service Bus", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "messaging-health.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(&args.config)?;

    logging::init(&config.observability.log_level);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %args.config.display(),
        checks = config.checks.len(),
        "messaging-health starting"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let http = reqwest::Client::builder()
        .user_agent(concat!("messaging-health/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let service = Arc::new(startup::build_service(&config, ProbeClients::rest(http))?);

    let latest = LatestReport::new();
    let shutdown = Shutdown::new();

    let monitor = HealthMonitor::new(
        service.clone(),
        Duration::from_secs(config.server.interval_secs),
        latest.clone(),
        shutdown.token(),
    );
    let monitor_handle = tokio::spawn(monitor.run(shutdown.subscribe()));

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    let server = HealthServer::new(service, latest);
    let server_handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    signals::shutdown_signal().await;
    shutdown.trigger();

    monitor_handle.await?;
    server_handle.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
