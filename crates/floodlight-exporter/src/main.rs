//! Floodlight Exporter
//!
//! Main entry point for the floodlight-exporter daemon.
//! Binds the metrics endpoint, then polls the controller forever.
//!
//! # NIST 800-53 Rev 5 Control Mappings
//! - AU-3: Content of Audit Records - Structured logging
//! - AU-12: Audit Record Generation - Log daemon lifecycle
//! - CM-6: Configuration Settings - File and CLI configuration

use anyhow::Context;
use clap::Parser;
use floodlight_exporter::{
    ControllerClient, DEFAULT_CONFIG_PATH, ExporterConfig, HealthState, MetricsCollector,
    MetricsServer, MetricsServerConfig, Poller, spawn_metrics_server,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::signal;
use tracing::info;

/// Floodlight controller to Prometheus exporter
#[derive(Parser, Debug)]
#[command(name = "floodlight-exporter")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short = 'c', long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Controller REST API base URL (overrides config)
    #[arg(long)]
    controller_url: Option<String>,

    /// Metrics listen address (overrides config)
    #[arg(long)]
    listen_addr: Option<SocketAddr>,

    /// Seconds between poll cycles (overrides config)
    #[arg(long)]
    interval_secs: Option<u64>,

    /// Per-request timeout in seconds (overrides config)
    #[arg(long)]
    request_timeout_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn apply_overrides(&self, config: &mut ExporterConfig) {
        if let Some(url) = &self.controller_url {
            config.controller.base_url = url.clone();
        }
        if let Some(addr) = self.listen_addr {
            config.metrics.listen_addr = addr;
        }
        if let Some(secs) = self.interval_secs {
            config.polling.interval_secs = secs;
        }
        if let Some(secs) = self.request_timeout_secs {
            config.controller.request_timeout_secs = secs;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    info!("floodlight-exporter: Starting");

    let mut config = ExporterConfig::load_or_default(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    args.apply_overrides(&mut config);
    config.validate().context("invalid configuration")?;

    let metrics = MetricsCollector::new().context("creating metrics registry")?;
    let health = HealthState::new();

    let server = MetricsServer::bind(
        MetricsServerConfig {
            listen_addr: config.metrics.listen_addr,
        },
        metrics.clone(),
        health.clone(),
    )
    .await
    .context("starting metrics server")?;
    info!(
        "floodlight-exporter: Prometheus exporter running on {}",
        server.local_addr()?
    );
    let _server_task = spawn_metrics_server(server);

    let client = ControllerClient::new(&config, metrics.clone())?;
    let poller = Poller::new(client, metrics, health, config.poll_interval());

    tokio::select! {
        _ = poller.run() => {}
        _ = signal::ctrl_c() => {
            info!("floodlight-exporter: Received SIGINT, exiting");
        }
    }

    Ok(())
}

/// Initialize structured logging
///
/// `RUST_LOG` takes precedence over `--log-level`.
fn init_logging(log_level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .init();
}
