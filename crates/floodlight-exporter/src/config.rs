//! Configuration file support for floodlight-exporter
//!
//! Loads and validates exporter configuration from TOML files.
//! Default location: /etc/floodlight-exporter/config.toml
//!
//! # NIST 800-53 Rev 5 Control Mappings
//! - CM-6: Configuration Settings - Externalized, validated settings

use crate::error::{ExporterError, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "/etc/floodlight-exporter/config.toml";

/// Controller connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Base URL of the controller REST API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Total timeout per request in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// Metrics endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Address the `/metrics` endpoint binds to
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
}

/// Poll cadence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Pause between the end of one cycle and the start of the next
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
}

/// Complete exporter configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExporterConfig {
    #[serde(default)]
    pub controller: ControllerConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,

    #[serde(default)]
    pub polling: PollingConfig,
}

// Default functions
fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_request_timeout() -> u64 {
    5
}

fn default_connect_timeout() -> u64 {
    2
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8000))
}

fn default_interval() -> u64 {
    10
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
        }
    }
}

impl ExporterConfig {
    /// Load configuration from file, falling back to defaults if file not found
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content).map_err(|e| {
                ExporterError::Config(format!(
                    "Failed to parse config file {}: {}",
                    path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "Config file not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(ExporterError::Io(e)),
        }
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ExporterError::Config(e.to_string()))
    }

    /// Serialize configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ExporterError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Parsed controller base URL
    pub fn controller_url(&self) -> Result<Url> {
        let url = Url::parse(&self.controller.base_url).map_err(|e| {
            ExporterError::Config(format!(
                "Invalid controller base_url '{}': {}",
                self.controller.base_url, e
            ))
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ExporterError::Config(format!(
                "Unsupported controller URL scheme '{}'",
                other
            ))),
        }
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.controller.request_timeout_secs)
    }

    /// Get connect timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.controller.connect_timeout_secs)
    }

    /// Get poll interval as Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.polling.interval_secs)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.controller_url()?;

        if self.controller.request_timeout_secs == 0 {
            return Err(ExporterError::Config(
                "request_timeout_secs must be > 0".to_string(),
            ));
        }

        if self.controller.connect_timeout_secs == 0 {
            return Err(ExporterError::Config(
                "connect_timeout_secs must be > 0".to_string(),
            ));
        }

        if self.polling.interval_secs == 0 {
            return Err(ExporterError::Config(
                "interval_secs must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}
