//! Session configuration
//!
//! ```yaml
//! port: /dev/rfcomm0
//! baud_rate: 9600
//! data_mode: D7
//! max_consecutive_errors: 20
//! ```
//!
//! Every field is optional in the document; missing fields take their defaults.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::DataMode;
use crate::{OximeterError, Result};

/// Settings for one decoding session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Serial device path; required for serial sessions only
    pub port: String,
    pub baud_rate: u32,
    /// Mode written to the device after the port opens
    pub data_mode: DataMode,
    /// Serial read timeout, also the reader thread's shutdown latency
    pub read_timeout_ms: u64,
    /// Bytes requested per read
    pub read_buffer: usize,
    /// Packets buffered between the worker and a channel consumer
    pub channel_capacity: usize,
    /// Cap on the exponential backoff after consecutive read errors
    pub max_backoff_ms: u64,
    /// Stop after this many consecutive read errors; `None` retries forever
    pub max_consecutive_errors: Option<u32>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: 9600,
            data_mode: DataMode::default(),
            read_timeout_ms: 100,
            read_buffer: 64,
            channel_capacity: 1,
            max_backoff_ms: 1600,
            max_consecutive_errors: None,
        }
    }
}

impl SessionConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml_ng::from_str(yaml)
            .map_err(|e| OximeterError::parse_error("session config YAML", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load, parse and validate a YAML file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| OximeterError::io_error(format!("reading {}", path.display()), e))?;
        debug!("Loaded session config from {}", path.display());
        Self::from_yaml_str(&yaml)
    }

    /// Reject values the session cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.baud_rate == 0 {
            return Err(OximeterError::config_error("baud_rate must be non-zero"));
        }
        if self.read_buffer == 0 {
            return Err(OximeterError::config_error("read_buffer must be non-zero"));
        }
        if self.channel_capacity == 0 {
            return Err(OximeterError::config_error("channel_capacity must be non-zero"));
        }
        if self.max_consecutive_errors == Some(0) {
            return Err(OximeterError::config_error(
                "max_consecutive_errors must be at least 1 when set",
            ));
        }
        Ok(())
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_device_expectations() {
        let config = SessionConfig::default();
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.data_mode, DataMode::D7);
        assert_eq!(config.channel_capacity, 1);
        assert_eq!(config.max_consecutive_errors, None);
        assert_eq!(config.max_backoff(), Duration::from_millis(1600));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_document_keeps_defaults() {
        let config = SessionConfig::from_yaml_str(
            "port: /dev/rfcomm0\ndata_mode: D13\nmax_consecutive_errors: 5\n",
        )
        .expect("valid config");

        assert_eq!(config.port, "/dev/rfcomm0");
        assert_eq!(config.data_mode, DataMode::D13);
        assert_eq!(config.max_consecutive_errors, Some(5));
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.read_buffer, 64);
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(SessionConfig::from_yaml_str("  \n").expect("empty"), SessionConfig::default());
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = SessionConfig::from_yaml_str("baud_rate: [fast").expect_err("malformed");
        assert!(matches!(err, OximeterError::Parse { .. }));
    }

    #[test]
    fn unknown_data_mode_is_rejected() {
        let err = SessionConfig::from_yaml_str("data_mode: D99\n").expect_err("bad mode");
        assert!(matches!(err, OximeterError::Parse { .. }));
    }

    #[test]
    fn invalid_values_fail_validation() {
        let invalid = [
            "baud_rate: 0",
            "read_buffer: 0",
            "channel_capacity: 0",
            "max_consecutive_errors: 0",
        ];
        for yaml in invalid {
            let err = SessionConfig::from_yaml_str(yaml).expect_err(yaml);
            assert!(matches!(err, OximeterError::Config { .. }), "{yaml}: {err}");
        }
    }

    #[test]
    fn loads_from_file() {
        let path = std::env::temp_dir().join(format!("pulseox-config-{}.yaml", std::process::id()));
        std::fs::write(&path, "port: COM4\nbaud_rate: 19200\n").expect("write temp config");

        let config = SessionConfig::from_path(&path);
        let _ = std::fs::remove_file(&path);

        let config = config.expect("loads");
        assert_eq!(config.port, "COM4");
        assert_eq!(config.baud_rate, 19200);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = SessionConfig::from_path("/nonexistent/pulseox.yaml").expect_err("missing");
        assert!(matches!(err, OximeterError::Io { .. }));
    }
}
