//! Floodlight controller REST client
//!
//! Issues the two read-only queries the exporter needs and decodes their
//! JSON defensively. Every failure is logged and counted here; callers only
//! ever see (possibly empty) data.
//!
//! # NIST 800-53 Rev 5 Control Mappings
//! - SI-4: System Monitoring - Collect switch port statistics
//! - SI-10: Information Input Validation - Tolerate malformed controller replies
//! - SI-11: Error Handling - Failures contained to a single request

use crate::config::ExporterConfig;
use crate::error::{ExporterError, Result};
use crate::metrics::MetricsCollector;
use crate::types::{
    ConversionFailure, PORT_FIELD, PORT_NUMBER_FIELD, PORT_REPLY_FIELD, PortLabel, PortSample,
    PortStatsOutcome, RX_PACKETS_FIELD, SwitchRecord, TX_PACKETS_FIELD,
};
use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

/// Path of the switch inventory endpoint
const SWITCHES_PATH: [&str; 5] = ["wm", "core", "controller", "switches", "json"];

/// Source of switch inventory and port samples
///
/// Implementations never fail: errors are handled at the point of
/// occurrence and surface as empty results.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Current switch listing, in controller order
    async fn list_switches(&self) -> Vec<SwitchRecord>;

    /// Latest port samples for one switch
    async fn fetch_port_stats(&self, switch_id: &str) -> Vec<PortSample>;
}

/// HTTP client for the controller's REST API
pub struct ControllerClient {
    http: reqwest::Client,
    base_url: Url,
    metrics: MetricsCollector,
}

impl ControllerClient {
    /// Create a client with the configured base URL and timeouts
    pub fn new(config: &ExporterConfig, metrics: MetricsCollector) -> Result<Self> {
        let base_url = config.controller_url()?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| ExporterError::Config(format!("Failed to build HTTP client: {}", e)))?;

        info!(
            base_url = %base_url,
            timeout_secs = config.controller.request_timeout_secs,
            "Controller client initialized"
        );

        Ok(Self {
            http,
            base_url,
            metrics,
        })
    }

    /// `{base}/wm/core/controller/switches/json`
    pub fn switches_url(&self) -> Url {
        self.endpoint(&SWITCHES_PATH)
    }

    /// `{base}/wm/core/switch/{switch_id}/port/json`
    pub fn port_stats_url(&self, switch_id: &str) -> Url {
        self.endpoint(&["wm", "core", "switch", switch_id, "port", "json"])
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // http(s) URLs always have a path, validated in ExporterConfig
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Fetch the switch listing, surfacing the failure class
    pub async fn try_list_switches(&self) -> Result<Vec<SwitchRecord>> {
        let url = self.switches_url();
        let endpoint = url.to_string();
        let body = self.get_json(url).await?;
        parse_switch_listing(&endpoint, &body)
    }

    /// Fetch and decode one switch's port statistics, surfacing the failure class
    pub async fn try_fetch_port_stats(&self, switch_id: &str) -> Result<PortStatsOutcome> {
        let body = self.get_json(self.port_stats_url(switch_id)).await?;
        Ok(parse_port_stats(switch_id, &body))
    }

    async fn get_json(&self, url: Url) -> Result<Value> {
        let endpoint = url.to_string();
        debug!(endpoint = %endpoint, "GET");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| ExporterError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExporterError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| ExporterError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;

        serde_json::from_slice(&body).map_err(|e| ExporterError::Decode {
            endpoint,
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl StatsSource for ControllerClient {
    #[instrument(skip(self))]
    async fn list_switches(&self) -> Vec<SwitchRecord> {
        match self.try_list_switches().await {
            Ok(switches) => {
                debug!(count = switches.len(), "Fetched switch listing");
                switches
            }
            Err(e) => {
                warn!(error = %e, kind = %e.kind(), "Error fetching switch data");
                self.metrics.record_error(e.kind());
                Vec::new()
            }
        }
    }

    #[instrument(skip(self))]
    async fn fetch_port_stats(&self, switch_id: &str) -> Vec<PortSample> {
        let outcome = match self.try_fetch_port_stats(switch_id).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(
                    switch_id,
                    error = %e,
                    kind = %e.kind(),
                    "Error fetching stats for switch"
                );
                self.metrics.record_error(e.kind());
                return Vec::new();
            }
        };

        if outcome.missing_port_reply {
            let e = ExporterError::MissingField {
                switch_id: switch_id.to_string(),
                field: PORT_REPLY_FIELD,
            };
            info!(switch_id, kind = %e.kind(), "No port_reply data found for switch");
            self.metrics.record_error(e.kind());
        }

        for failure in &outcome.conversion_failures {
            let e = ExporterError::Conversion {
                field: failure.field,
                value: failure.value.clone(),
            };
            warn!(
                switch_id,
                port = %failure.port,
                error = %e,
                kind = %e.kind(),
                "Data processing error for switch, counter set to 0"
            );
            self.metrics.record_error(e.kind());
        }

        outcome.samples
    }
}

/// Decode the switch listing body
///
/// The body must be a JSON array; elements without a usable identifier are
/// kept as id-less records so callers can skip them.
pub fn parse_switch_listing(endpoint: &str, body: &Value) -> Result<Vec<SwitchRecord>> {
    let items = body.as_array().ok_or_else(|| ExporterError::Decode {
        endpoint: endpoint.to_string(),
        reason: format!("expected a JSON array, got {}", json_type(body)),
    })?;

    Ok(items.iter().map(SwitchRecord::from_value).collect())
}

/// Decode one port statistics reply into samples
///
/// Every reply group is walked. Counter fields that are missing or null
/// become 0; unconvertible ones also become 0 and are reported.
pub fn parse_port_stats(switch_id: &str, body: &Value) -> PortStatsOutcome {
    let Some(groups) = body.get(PORT_REPLY_FIELD).and_then(Value::as_array) else {
        return PortStatsOutcome {
            missing_port_reply: true,
            ..Default::default()
        };
    };

    let mut outcome = PortStatsOutcome::default();

    let entries = groups
        .iter()
        .filter_map(|group| group.get(PORT_FIELD).and_then(Value::as_array))
        .flatten()
        .filter(|entry| entry.is_object());

    for entry in entries {
        let port = PortLabel::from_value(entry.get(PORT_NUMBER_FIELD));

        let mut counter = |field: &'static str| match parse_counter(entry.get(field)) {
            Ok(value) => value,
            Err(raw) => {
                outcome.conversion_failures.push(ConversionFailure {
                    port: port.clone(),
                    field,
                    value: raw,
                });
                0
            }
        };

        let tx = counter(TX_PACKETS_FIELD);
        let rx = counter(RX_PACKETS_FIELD);

        outcome.samples.push(PortSample::new(switch_id, port, tx, rx));
    }

    outcome
}

/// Convert a raw counter value to a packet count
///
/// Accepts non-negative integers, decimal strings and non-negative floats
/// (truncated). On failure the raw JSON text is returned.
pub fn parse_counter(value: Option<&Value>) -> std::result::Result<u64, String> {
    match value {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0 && *f < u64::MAX as f64)
                    .map(|f| f.trunc() as u64)
            })
            .ok_or_else(|| n.to_string()),
        Some(Value::String(s)) => s.trim().parse::<u64>().map_err(|_| format!("{:?}", s)),
        Some(other) => Err(other.to_string()),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DPID: &str = "00:00:00:00:00:00:00:01";

    fn client_for(base_url: &str) -> ControllerClient {
        let mut config = ExporterConfig::default();
        config.controller.base_url = base_url.to_string();
        ControllerClient::new(&config, MetricsCollector::new().unwrap()).unwrap()
    }

    #[test]
    fn test_switches_url() {
        let client = client_for("http://192.168.253.128:8080");
        assert_eq!(
            client.switches_url().as_str(),
            "http://192.168.253.128:8080/wm/core/controller/switches/json"
        );
    }

    #[test]
    fn test_port_stats_url_keeps_dpid_colons() {
        let client = client_for("http://10.0.0.5:8080/");
        assert_eq!(
            client.port_stats_url(DPID).as_str(),
            "http://10.0.0.5:8080/wm/core/switch/00:00:00:00:00:00:00:01/port/json"
        );
    }

    #[test]
    fn test_url_with_path_prefix() {
        let client = client_for("http://proxy.example/floodlight/");
        assert_eq!(
            client.switches_url().as_str(),
            "http://proxy.example/floodlight/wm/core/controller/switches/json"
        );
    }

    #[test]
    fn test_port_stats_url_escapes_slash() {
        let client = client_for("http://10.0.0.5:8080");
        let url = client.port_stats_url("a/b");
        assert!(url.as_str().contains("/switch/a%2Fb/port/json"));
    }

    #[test]
    fn test_client_rejects_bad_url() {
        let mut config = ExporterConfig::default();
        config.controller.base_url = "::::".to_string();
        assert!(ControllerClient::new(&config, MetricsCollector::new().unwrap()).is_err());
    }

    #[test]
    fn test_parse_switch_listing_preserves_order() {
        let body = json!([
            { "switchDPID": "00:00:00:00:00:00:00:03" },
            { "switchDPID": "00:00:00:00:00:00:00:01" },
            { "inetAddress": "/10.0.0.9:6653" },
            { "switchDPID": "00:00:00:00:00:00:00:03" }
        ]);
        let records = parse_switch_listing("test", &body).unwrap();
        let ids: Vec<Option<&str>> = records.iter().map(SwitchRecord::id).collect();
        assert_eq!(
            ids,
            vec![
                Some("00:00:00:00:00:00:00:03"),
                Some("00:00:00:00:00:00:00:01"),
                None,
                Some("00:00:00:00:00:00:00:03"),
            ]
        );
    }

    #[test]
    fn test_parse_switch_listing_rejects_object() {
        let err = parse_switch_listing("test", &json!({ "switches": [] })).unwrap_err();
        assert!(matches!(err, ExporterError::Decode { .. }));
        assert!(err.to_string().contains("object"));
    }

    #[test]
    fn test_parse_port_stats_basic() {
        let body = json!({
            "port_reply": [{
                "version": "OF_13",
                "port": [
                    { "port_number": "3", "transmit_packets": "120", "receive_packets": "45" },
                    { "port_number": "local", "transmit_packets": "0", "receive_packets": "2" }
                ]
            }]
        });
        let outcome = parse_port_stats(DPID, &body);
        assert!(!outcome.missing_port_reply);
        assert!(outcome.conversion_failures.is_empty());
        assert_eq!(
            outcome.samples,
            vec![
                PortSample::new(DPID, PortLabel::from("3"), 120, 45),
                PortSample::new(DPID, PortLabel::from("local"), 0, 2),
            ]
        );
    }

    #[test]
    fn test_parse_port_stats_missing_counters_default_to_zero() {
        let body = json!({ "port_reply": [{ "port": [{ "port_number": 1 }] }] });
        let outcome = parse_port_stats(DPID, &body);
        assert_eq!(
            outcome.samples,
            vec![PortSample::new(DPID, PortLabel::from("1"), 0, 0)]
        );
        assert!(outcome.conversion_failures.is_empty());
    }

    #[test]
    fn test_parse_port_stats_bad_counter_reported_and_zeroed() {
        let body = json!({
            "port_reply": [{ "port": [
                { "port_number": 2, "transmit_packets": "lots", "receive_packets": "9" },
                { "port_number": 4, "transmit_packets": "5", "receive_packets": "6" }
            ]}]
        });
        let outcome = parse_port_stats(DPID, &body);
        assert_eq!(
            outcome.samples,
            vec![
                PortSample::new(DPID, PortLabel::from("2"), 0, 9),
                PortSample::new(DPID, PortLabel::from("4"), 5, 6),
            ]
        );
        assert_eq!(
            outcome.conversion_failures,
            vec![ConversionFailure {
                port: PortLabel::from("2"),
                field: TX_PACKETS_FIELD,
                value: "\"lots\"".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_port_stats_missing_port_reply() {
        let outcome = parse_port_stats(DPID, &json!({ "error": "switch not found" }));
        assert!(outcome.missing_port_reply);
        assert!(outcome.samples.is_empty());
    }

    #[test]
    fn test_parse_port_stats_unknown_port_sentinel() {
        let body = json!({ "port_reply": [{ "port": [{ "transmit_packets": "1" }] }] });
        let outcome = parse_port_stats(DPID, &body);
        assert_eq!(outcome.samples.len(), 1);
        assert!(outcome.samples[0].port.is_unknown());
        assert_eq!(outcome.samples[0].counters.tx_packets, 1);
    }

    #[test]
    fn test_parse_port_stats_walks_all_groups() {
        let body = json!({
            "port_reply": [
                { "port": [{ "port_number": 1, "transmit_packets": 1 }] },
                { "no_ports": true },
                { "port": [{ "port_number": 2, "receive_packets": 2 }] }
            ]
        });
        let outcome = parse_port_stats(DPID, &body);
        assert_eq!(
            outcome.samples,
            vec![
                PortSample::new(DPID, PortLabel::from("1"), 1, 0),
                PortSample::new(DPID, PortLabel::from("2"), 0, 2),
            ]
        );
    }

    #[test]
    fn test_parse_counter_variants() {
        assert_eq!(parse_counter(None), Ok(0));
        assert_eq!(parse_counter(Some(&Value::Null)), Ok(0));
        assert_eq!(parse_counter(Some(&json!(42))), Ok(42));
        assert_eq!(parse_counter(Some(&json!("42"))), Ok(42));
        assert_eq!(parse_counter(Some(&json!(" 17 "))), Ok(17));
        assert_eq!(parse_counter(Some(&json!(3.9))), Ok(3));
        assert_eq!(
            parse_counter(Some(&json!("18446744073709551615"))),
            Ok(u64::MAX)
        );
        assert!(parse_counter(Some(&json!(-1))).is_err());
        assert!(parse_counter(Some(&json!("1.5"))).is_err());
        assert!(parse_counter(Some(&json!("abc"))).is_err());
        assert!(parse_counter(Some(&json!(true))).is_err());
        assert!(parse_counter(Some(&json!([1]))).is_err());
    }
}
