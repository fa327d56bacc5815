//! HTTP metrics server for Prometheus scraping
//!
//! Serves `/metrics` in the Prometheus text format and a small `/health`
//! JSON summary of the last poll cycle. Plain HTTP only.
//!
//! # NIST 800-53 Rev 5 Control Mappings
//! - AU-6: Audit Record Review - Metrics endpoint for analysis
//! - SI-4: System Monitoring - HTTP endpoint for monitoring systems

use crate::error::{ExporterError, Result};
use crate::metrics::MetricsCollector;
use crate::poller::{CycleReport, HealthState};
use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get,
};
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Metrics server configuration
#[derive(Debug, Clone)]
pub struct MetricsServerConfig {
    pub listen_addr: SocketAddr,
}

impl Default for MetricsServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
        }
    }
}

/// State shared with request handlers
#[derive(Clone)]
struct MetricsServerState {
    collector: MetricsCollector,
    health: HealthState,
}

/// Body of `GET /health`
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    last_cycle: Option<CycleReport>,
}

/// Metrics HTTP server with its listener already bound
pub struct MetricsServer {
    listener: TcpListener,
    router: Router,
}

impl MetricsServer {
    /// Bind the listen address
    ///
    /// Failing to bind is fatal for the exporter, so the error is returned
    /// to the caller instead of being logged and swallowed.
    pub async fn bind(
        config: MetricsServerConfig,
        collector: MetricsCollector,
        health: HealthState,
    ) -> Result<Self> {
        let listener = TcpListener::bind(config.listen_addr).await.map_err(|e| {
            ExporterError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to bind metrics server to {}: {}", config.listen_addr, e),
            ))
        })?;

        let router = router(MetricsServerState { collector, health });

        Ok(Self { listener, router })
    }

    /// Address actually bound (resolves port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve requests until the task is dropped
    pub async fn serve(self) -> Result<()> {
        let addr = self.local_addr()?;
        info!("Starting metrics server on http://{}/metrics", addr);

        axum::serve(self.listener, self.router).await?;
        Ok(())
    }
}

/// Run the server on a background task
pub fn spawn_metrics_server(server: MetricsServer) -> tokio::task::JoinHandle<Result<()>> {
    tokio::spawn(async move {
        let result = server.serve().await;
        if let Err(e) = &result {
            error!(error = %e, "Metrics server stopped");
        }
        result
    })
}

fn router(state: MetricsServerState) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Handle /metrics endpoint - Prometheus text format
async fn metrics_handler(State(state): State<MetricsServerState>) -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = state.collector.registry().gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", encoder.format_type())],
            buffer,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode metrics").into_response()
        }
    }
}

/// Handle /health endpoint
async fn health_handler(State(state): State<MetricsServerState>) -> impl IntoResponse {
    let last_cycle = state.health.last_cycle();
    let status = health_status(last_cycle.as_ref());

    (StatusCode::OK, Json(HealthResponse { status, last_cycle }))
}

fn health_status(last_cycle: Option<&CycleReport>) -> &'static str {
    match last_cycle {
        None => "starting",
        Some(report) if report.errors > 0 => "degraded",
        Some(_) => "ok",
    }
}
