//! Core types for controller polling
//!
//! # NIST 800-53 Rev 5 Control Mappings
//! - CM-8: System Component Inventory - Switches reported by the controller
//! - SI-4: System Monitoring - Per-port traffic samples
//! - SI-10: Information Input Validation - Defensive decoding of controller JSON

use serde_json::Value;
use std::fmt;

/// Switch identifier field in Floodlight v1.x listings
pub const SWITCH_ID_FIELD: &str = "switchDPID";
/// Switch identifier field in pre-1.0 Floodlight listings
pub const LEGACY_SWITCH_ID_FIELD: &str = "dpid";

/// Top-level field of the per-switch port statistics reply
pub const PORT_REPLY_FIELD: &str = "port_reply";
/// Per-group field holding the port entries
pub const PORT_FIELD: &str = "port";
pub const PORT_NUMBER_FIELD: &str = "port_number";
pub const TX_PACKETS_FIELD: &str = "transmit_packets";
pub const RX_PACKETS_FIELD: &str = "receive_packets";

/// Label used when a port entry carries no port number
pub const UNKNOWN_PORT: &str = "unknown";

/// One element of the controller's switch listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchRecord {
    /// Datapath identifier, `None` when the record has no usable id
    pub dpid: Option<String>,
}

impl SwitchRecord {
    pub fn new(dpid: impl Into<String>) -> Self {
        Self {
            dpid: Some(dpid.into()),
        }
    }

    /// Extract the identifier from a raw listing element
    ///
    /// Non-object elements, non-string ids and empty ids all yield a record
    /// without an identifier.
    pub fn from_value(value: &Value) -> Self {
        let dpid = value
            .get(SWITCH_ID_FIELD)
            .or_else(|| value.get(LEGACY_SWITCH_ID_FIELD))
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        Self { dpid }
    }

    /// Usable identifier, if any
    pub fn id(&self) -> Option<&str> {
        self.dpid.as_deref()
    }
}

/// Value of the `port` metric label
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortLabel(String);

impl PortLabel {
    /// Label for an entry without a port number
    pub fn unknown() -> Self {
        Self(UNKNOWN_PORT.to_string())
    }

    /// Render a raw `port_number` value as a label
    ///
    /// Numbers use their decimal form, strings (e.g. `"local"`) are kept
    /// verbatim, anything else falls back to the sentinel.
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Number(n)) => Self(n.to_string()),
            Some(Value::String(s)) if !s.is_empty() => Self(s.clone()),
            _ => Self::unknown(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_PORT
    }
}

impl From<&str> for PortLabel {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for PortLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Packet counters for a single port
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortCounters {
    pub tx_packets: u64,
    pub rx_packets: u64,
}

/// Latest observed counters for one (switch, port) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSample {
    pub switch_id: String,
    pub port: PortLabel,
    pub counters: PortCounters,
}

impl PortSample {
    pub fn new(switch_id: impl Into<String>, port: PortLabel, tx: u64, rx: u64) -> Self {
        Self {
            switch_id: switch_id.into(),
            port,
            counters: PortCounters {
                tx_packets: tx,
                rx_packets: rx,
            },
        }
    }
}

/// A counter field that could not be converted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionFailure {
    pub port: PortLabel,
    pub field: &'static str,
    pub value: String,
}

/// Result of decoding one port statistics reply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortStatsOutcome {
    pub samples: Vec<PortSample>,
    pub conversion_failures: Vec<ConversionFailure>,
    /// `port_reply` was absent, nothing was published
    pub missing_port_reply: bool,
}
