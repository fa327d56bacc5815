//! Prometheus metrics collection for floodlight-exporter
//!
//! Holds the republished per-port packet gauges and the exporter's own
//! operational metrics in a single registry.
//!
//! # NIST 800-53 Rev 5 Control Mappings
//! - AU-6: Audit Record Review - Metrics available for analysis
//! - SI-4: System Monitoring - Switch traffic and exporter health metrics

use crate::error::ErrorKind;
use crate::types::PortSample;
use prometheus::{
    Counter, CounterVec, Encoder, Gauge, GaugeVec, Histogram, HistogramOpts, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

/// Label names shared by both packet gauge families
pub const PORT_LABELS: [&str; 2] = ["switch_id", "port"];

/// Metrics registry shared by the poll loop (writer) and the scrape handler (reader)
///
/// # NIST Controls
/// - SI-4: System Monitoring - Centralized metrics collection
#[derive(Clone)]
pub struct MetricsCollector {
    // Republished controller counters
    packets_sent: GaugeVec,
    packets_received: GaugeVec,

    // Exporter health
    poll_cycles_total: Counter,
    errors_total: CounterVec,
    switches: Gauge,
    poll_duration_seconds: Histogram,

    registry: Arc<Registry>,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let packets_sent = GaugeVec::new(
            Opts::new(
                "floodlight_packets_sent_total",
                "Total packets sent by each switch port",
            ),
            &PORT_LABELS,
        )?;
        registry.register(Box::new(packets_sent.clone()))?;

        let packets_received = GaugeVec::new(
            Opts::new(
                "floodlight_packets_received_total",
                "Total packets received by each switch port",
            ),
            &PORT_LABELS,
        )?;
        registry.register(Box::new(packets_received.clone()))?;

        let poll_cycles_total = Counter::new(
            "floodlight_exporter_poll_cycles_total",
            "Total number of completed poll cycles",
        )?;
        registry.register(Box::new(poll_cycles_total.clone()))?;

        let errors_total = CounterVec::new(
            Opts::new(
                "floodlight_exporter_errors_total",
                "Controller polling errors by class",
            ),
            &["kind"],
        )?;
        registry.register(Box::new(errors_total.clone()))?;

        let switches = Gauge::new(
            "floodlight_exporter_switches",
            "Switches with a usable identifier in the last listing",
        )?;
        registry.register(Box::new(switches.clone()))?;

        let poll_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "floodlight_exporter_poll_duration_seconds",
                "Duration of a complete poll cycle in seconds",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )?;
        registry.register(Box::new(poll_duration_seconds.clone()))?;

        Ok(Self {
            packets_sent,
            packets_received,
            poll_cycles_total,
            errors_total,
            switches,
            poll_duration_seconds,
            registry: Arc::new(registry),
        })
    }

    /// Publish samples as the latest values for their (switch, port) keys
    ///
    /// Values are set, never added, so re-applying a sample is idempotent.
    pub fn apply_samples(&self, samples: &[PortSample]) {
        for sample in samples {
            let labels = [sample.switch_id.as_str(), sample.port.as_str()];
            self.packets_sent
                .with_label_values(&labels)
                .set(sample.counters.tx_packets as f64);
            self.packets_received
                .with_label_values(&labels)
                .set(sample.counters.rx_packets as f64);
        }
    }

    /// Count one error of the given class
    pub fn record_error(&self, kind: ErrorKind) {
        self.errors_total.with_label_values(&[kind.as_str()]).inc();
    }

    /// Record a finished poll cycle
    pub fn record_cycle(&self, duration: Duration, switches: usize) {
        self.poll_cycles_total.inc();
        self.poll_duration_seconds.observe(duration.as_secs_f64());
        self.switches.set(switches as f64);
    }

    /// Number of errors recorded for a class
    pub fn error_count(&self, kind: ErrorKind) -> u64 {
        self.errors_total
            .get_metric_with_label_values(&[kind.as_str()])
            .map(|c| c.get() as u64)
            .unwrap_or(0)
    }

    /// Errors recorded across all classes
    pub fn total_errors(&self) -> u64 {
        ErrorKind::ALL.iter().map(|k| self.error_count(*k)).sum()
    }

    /// Number of completed poll cycles
    pub fn poll_cycles(&self) -> u64 {
        self.poll_cycles_total.get() as u64
    }

    /// Encode every registered family in Prometheus text format
    pub fn gather_metrics(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();

        let mut buffer = vec![];
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            error!(error = %e, "Failed to encode metrics");
            return String::new();
        }

        String::from_utf8(buffer).unwrap_or_default()
    }

    /// Underlying registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PortLabel;

    const DPID: &str = "00:00:00:00:00:00:00:01";

    impl MetricsCollector {
        fn packets_sent(&self, switch_id: &str, port: &str) -> f64 {
            self.packets_sent.with_label_values(&[switch_id, port]).get()
        }

        fn packets_received(&self, switch_id: &str, port: &str) -> f64 {
            self.packets_received.with_label_values(&[switch_id, port]).get()
        }
    }

    #[test]
    fn test_metrics_collector_creation() {
        let collector = MetricsCollector::new().unwrap();
        assert_eq!(collector.poll_cycles(), 0);
        assert_eq!(collector.error_count(ErrorKind::Transport), 0);
        assert!(!collector.gather_metrics().contains(DPID));
    }

    #[test]
    fn test_apply_samples_sets_both_gauges() {
        let collector = MetricsCollector::new().unwrap();
        collector.apply_samples(&[PortSample::new(DPID, PortLabel::from("3"), 120, 45)]);

        assert_eq!(collector.packets_sent(DPID, "3"), 120.0);
        assert_eq!(collector.packets_received(DPID, "3"), 45.0);
    }

    #[test]
    fn test_apply_same_sample_twice_is_idempotent() {
        let collector = MetricsCollector::new().unwrap();
        let sample = PortSample::new(DPID, PortLabel::from("1"), 10, 20);

        collector.apply_samples(std::slice::from_ref(&sample));
        collector.apply_samples(std::slice::from_ref(&sample));

        assert_eq!(collector.packets_sent(DPID, "1"), 10.0);
        assert_eq!(collector.packets_received(DPID, "1"), 20.0);
    }

    #[test]
    fn test_last_write_wins() {
        let collector = MetricsCollector::new().unwrap();
        collector.apply_samples(&[PortSample::new(DPID, PortLabel::from("1"), 100, 100)]);
        collector.apply_samples(&[PortSample::new(DPID, PortLabel::from("1"), 7, 8)]);

        assert_eq!(collector.packets_sent(DPID, "1"), 7.0);
        assert_eq!(collector.packets_received(DPID, "1"), 8.0);
    }

    #[test]
    fn test_record_error_by_kind() {
        let collector = MetricsCollector::new().unwrap();
        collector.record_error(ErrorKind::Conversion);
        collector.record_error(ErrorKind::Conversion);
        collector.record_error(ErrorKind::Transport);

        assert_eq!(collector.error_count(ErrorKind::Conversion), 2);
        assert_eq!(collector.error_count(ErrorKind::Transport), 1);
        assert_eq!(collector.error_count(ErrorKind::Status), 0);
    }

    #[test]
    fn test_record_cycle() {
        let collector = MetricsCollector::new().unwrap();
        collector.record_cycle(Duration::from_millis(250), 4);

        assert_eq!(collector.poll_cycles(), 1);
        let output = collector.gather_metrics();
        assert!(output.contains("floodlight_exporter_switches 4"));
        assert!(output.contains("floodlight_exporter_poll_duration_seconds_bucket"));
    }

    #[test]
    fn test_gather_metrics_text_format() {
        let collector = MetricsCollector::new().unwrap();
        collector.apply_samples(&[PortSample::new(DPID, PortLabel::from("3"), 120, 45)]);

        let output = collector.gather_metrics();
        assert!(output.contains("# HELP floodlight_packets_sent_total"));
        assert!(output.contains("# TYPE floodlight_packets_sent_total gauge"));
        assert!(output.contains(
            "floodlight_packets_sent_total{port=\"3\",switch_id=\"00:00:00:00:00:00:00:01\"} 120"
        ));
        assert!(output.contains(
            "floodlight_packets_received_total{port=\"3\",switch_id=\"00:00:00:00:00:00:00:01\"} 45"
        ));
    }
}
