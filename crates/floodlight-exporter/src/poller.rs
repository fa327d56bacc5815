//! Poll loop - fetch controller counters and publish them on a fixed cadence
//!
//! # NIST 800-53 Rev 5 Control Mappings
//! - SI-4: System Monitoring - Continuous collection of switch port counters
//! - AU-12: Audit Record Generation - Log cycle outcomes

use crate::client::StatsSource;
use crate::metrics::MetricsCollector;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

/// Summary of one poll cycle
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CycleReport {
    /// Records returned by the switch listing
    pub switches_listed: usize,
    /// Switches with a usable identifier that were polled
    pub switches_polled: usize,
    /// Port samples applied to the registry
    pub samples_published: usize,
    /// Errors counted while the cycle ran
    pub errors: u64,
    /// Wall-clock duration of the cycle
    pub duration_ms: u64,
}

/// Last-cycle snapshot shared with the `/health` handler
#[derive(Debug, Clone, Default)]
pub struct HealthState {
    last_cycle: Arc<RwLock<Option<CycleReport>>>,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, report: CycleReport) {
        *self.last_cycle.write() = Some(report);
    }

    /// Report of the most recent completed cycle, `None` before the first
    pub fn last_cycle(&self) -> Option<CycleReport> {
        self.last_cycle.read().clone()
    }
}

/// Drives list → fetch → publish cycles against a [`StatsSource`]
pub struct Poller<S> {
    source: S,
    metrics: MetricsCollector,
    health: HealthState,
    interval: Duration,
}

impl<S: StatsSource> Poller<S> {
    pub fn new(source: S, metrics: MetricsCollector, health: HealthState, interval: Duration) -> Self {
        Self {
            source,
            metrics,
            health,
            interval,
        }
    }

    /// Run a single cycle
    ///
    /// Switches are processed sequentially in listing order, without sorting
    /// or deduplication. A failed or empty listing yields a no-op cycle.
    #[instrument(skip(self))]
    pub async fn run_cycle(&self) -> CycleReport {
        let started = Instant::now();
        let errors_before = self.metrics.total_errors();

        let switches = self.source.list_switches().await;
        let mut report = CycleReport {
            switches_listed: switches.len(),
            ..Default::default()
        };

        for switch_id in switches.iter().filter_map(|s| s.id()) {
            let samples = self.source.fetch_port_stats(switch_id).await;
            debug!(switch_id, ports = samples.len(), "Publishing port samples");

            self.metrics.apply_samples(&samples);
            report.switches_polled += 1;
            report.samples_published += samples.len();
        }

        let elapsed = started.elapsed();
        report.duration_ms = elapsed.as_millis() as u64;
        report.errors = self.metrics.total_errors().saturating_sub(errors_before);

        self.metrics.record_cycle(elapsed, report.switches_polled);
        self.health.update(report.clone());

        report
    }

    /// Cycle forever, pausing `interval` after each cycle
    pub async fn run(&self) {
        info!(interval_secs = self.interval.as_secs(), "Starting poll loop");

        loop {
            let report = self.run_cycle().await;
            info!(
                switches = report.switches_polled,
                samples = report.samples_published,
                errors = report.errors,
                duration_ms = report.duration_ms,
                "Poll cycle complete"
            );

            tokio::time::sleep(self.interval).await;
        }
    }
}
