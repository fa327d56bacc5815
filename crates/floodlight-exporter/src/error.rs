//! Error types for floodlight-exporter
//!
//! # NIST 800-53 Rev 5 Control Mappings
//! - SI-11: Error Handling - Structured error types with contextual information
//! - AU-3: Content of Audit Records - Errors include sufficient detail for audit

use thiserror::Error;

/// Errors that can occur while polling the controller or serving metrics
///
/// # NIST Controls
/// - SI-11(a): Generate error messages providing information necessary for corrective actions
#[derive(Debug, Error)]
pub enum ExporterError {
    /// Connection refused, DNS failure, timeout
    #[error("Transport error for {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// Controller answered with a non-success status
    #[error("Controller returned HTTP {status} for {endpoint}")]
    Status { endpoint: String, status: u16 },

    /// Response body was not valid JSON of the expected top-level type
    #[error("Failed to decode response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    /// Expected field absent from an otherwise valid response
    #[error("Field '{field}' missing from response for switch {switch_id}")]
    MissingField { switch_id: String, field: &'static str },

    /// Counter value could not be converted to a non-negative integer
    #[error("Cannot convert {field}={value} to a packet count")]
    Conversion { field: &'static str, value: String },

    /// Configuration error
    /// NIST: CM-6 (Configuration Settings) - Configuration validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// Prometheus registry error
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExporterError {
    /// Error class used as the `kind` label of the error counter
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Status { .. } => ErrorKind::Status,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::MissingField { .. } => ErrorKind::Shape,
            Self::Conversion { .. } => ErrorKind::Conversion,
            Self::Config(_) | Self::Metrics(_) | Self::Io(_) => ErrorKind::Internal,
        }
    }
}

/// Error classes reported in `floodlight_exporter_errors_total{kind}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Transport,
    Status,
    Decode,
    Shape,
    Conversion,
    Internal,
}

impl ErrorKind {
    pub const ALL: [Self; 6] = [
        Self::Transport,
        Self::Status,
        Self::Decode,
        Self::Shape,
        Self::Conversion,
        Self::Internal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Status => "status",
            Self::Decode => "decode",
            Self::Shape => "shape",
            Self::Conversion => "conversion",
            Self::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result type alias for exporter operations
pub type Result<T> = std::result::Result<T, ExporterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExporterError::Status {
            endpoint: "http://ctl/wm/core/controller/switches/json".to_string(),
            status: 503,
        };
        assert_eq!(
            err.to_string(),
            "Controller returned HTTP 503 for http://ctl/wm/core/controller/switches/json"
        );
    }

    #[test]
    fn test_conversion_is_distinct_from_transport() {
        let err = ExporterError::Conversion {
            field: "transmit_packets",
            value: "\"abc\"".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Conversion);
        assert_ne!(err.kind(), ErrorKind::Transport);
        assert_eq!(
            err.to_string(),
            "Cannot convert transmit_packets=\"abc\" to a packet count"
        );
    }

    #[test]
    fn test_missing_field_is_shape() {
        let err = ExporterError::MissingField {
            switch_id: "00:00:00:00:00:00:00:01".to_string(),
            field: "port_reply",
        };
        assert_eq!(err.kind(), ErrorKind::Shape);
        assert!(err.to_string().contains("00:00:00:00:00:00:00:01"));
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(ErrorKind::Transport.as_str(), "transport");
        assert_eq!(ErrorKind::Conversion.to_string(), "conversion");
        assert_eq!(ExporterError::Config("x".into()).kind(), ErrorKind::Internal);
    }
}
