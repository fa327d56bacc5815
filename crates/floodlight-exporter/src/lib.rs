//! Prometheus exporter for Floodlight SDN controller port counters
//!
//! Periodically polls the controller's REST API for its switch inventory and
//! per-port packet counters, and republishes the latest values as gauges.
//!
//! # NIST 800-53 Rev 5 Control Mappings
//!
//! | Control | Description | Implementation |
//! |---------|-------------|----------------|
//! | AU-6 | Audit Record Review | `/metrics` endpoint for the monitoring system |
//! | AU-12 | Audit Record Generation | Structured logging of every poll failure |
//! | CM-6 | Configuration Settings | TOML configuration with CLI overrides |
//! | CM-8 | System Component Inventory | Switch listing fetched every cycle |
//! | SI-4 | System Monitoring | Per-port transmit/receive counters |
//! | SI-10 | Input Validation | Defensive decoding of controller JSON |
//! | SI-11 | Error Handling | Failures contained to a single request |
//!
//! # Architecture
//!
//! ```text
//! +-----------------+       +------------------------+       +-------------+
//! |   Floodlight    |  GET  |  floodlight-exporter   |  GET  | Prometheus  |
//! |   controller    |<------|                        |<------|             |
//! |                 |       |  ControllerClient      |       |  /metrics   |
//! | switches/json   |       |        |               |       |             |
//! | port/json       |       |        v               |       +-------------+
//! +-----------------+       |  Poller --> Metrics    |
//!                           |            Collector   |
//!                           +------------------------+
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod metrics;
pub mod metrics_server;
pub mod poller;
pub mod types;

pub use client::{ControllerClient, StatsSource, parse_counter, parse_port_stats, parse_switch_listing};
pub use config::{DEFAULT_CONFIG_PATH, ExporterConfig};
pub use error::{ErrorKind, ExporterError, Result};
pub use metrics::MetricsCollector;
pub use metrics_server::{MetricsServer, MetricsServerConfig, spawn_metrics_server};
pub use poller::{CycleReport, HealthState, Poller};
pub use types::{PortCounters, PortLabel, PortSample, PortStatsOutcome, SwitchRecord};
