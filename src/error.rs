//! Error types for oximeter stream processing.
//!
//! Only failures of the surrounding machinery surface as [`OximeterError`]:
//! the byte stream, the serial device, configuration and the worker task.
//! Protocol conditions are never errors. A window that fails its checksum is
//! skipped, a truncated packet is dropped, and a field that cannot be decoded
//! yet reads as [`INVALID_DATA`](crate::INVALID_DATA).
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use pulseox::OximeterError;
//!
//! let error = OximeterError::config_error("baud rate must be non-zero");
//! if !error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::time::Duration;
use thiserror::Error;

/// Result type alias for oximeter operations.
pub type Result<T, E = OximeterError> = std::result::Result<T, E>;

/// Main error type for oximeter operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum OximeterError {
    #[error("I/O error during {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serial port error on '{port}'")]
    Serial {
        port: String,
        #[source]
        source: serialport::Error,
    },

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("Unknown data mode '{mode}' (expected D2, D7, D8 or D13)")]
    UnknownDataMode { mode: String },

    #[error("Packet consumer closed its channel")]
    ConsumerClosed,

    #[error("Decoder worker failed: {reason}")]
    WorkerFailed { reason: String },

    #[error("Operation timed out after {duration:?}")]
    Timeout { duration: Duration },
}

impl OximeterError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            OximeterError::Io { .. } => true,
            OximeterError::Serial { .. } => true,
            OximeterError::Timeout { .. } => true,
            OximeterError::Config { .. } => false,
            OximeterError::Parse { .. } => false,
            OximeterError::UnknownDataMode { .. } => false,
            OximeterError::ConsumerClosed => false,
            OximeterError::WorkerFailed { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            OximeterError::Io { .. } => vec![
                "Check that the oximeter is powered on and in range",
                "Reconnect the byte stream and start a new session",
            ],
            OximeterError::Serial { .. } => vec![
                "Check the serial device path",
                "Verify permissions on the serial device",
                "Ensure the device is paired and not held by another process",
            ],
            OximeterError::Config { .. } => vec![
                "Check configuration values against their documented ranges",
                "Start from SessionConfig::default() and override selectively",
            ],
            OximeterError::Parse { .. } => vec![
                "Check the configuration document is valid YAML",
                "Verify field names match SessionConfig",
            ],
            OximeterError::UnknownDataMode { .. } => vec![
                "Use one of the supported data modes: D2, D7, D8, D13",
                "Check the spelling of data_mode in the configuration",
            ],
            OximeterError::ConsumerClosed => vec![
                "Keep the packet stream alive for as long as the session runs",
                "Stop the session before dropping the consumer",
            ],
            OximeterError::WorkerFailed { .. } => vec![
                "Inspect logs for the worker panic message",
                "Start a new session",
            ],
            OximeterError::Timeout { .. } => vec![
                "Increase timeout duration",
                "Check that the device is still transmitting",
            ],
        }
    }

    /// Helper constructor for I/O errors with context.
    pub fn io_error(context: impl Into<String>, source: std::io::Error) -> Self {
        OximeterError::Io { context: context.into(), source }
    }

    /// Helper constructor for serial port errors.
    pub fn serial_error(port: impl Into<String>, source: serialport::Error) -> Self {
        OximeterError::Serial { port: port.into(), source }
    }

    /// Helper constructor for configuration errors.
    pub fn config_error(reason: impl Into<String>) -> Self {
        OximeterError::Config { reason: reason.into() }
    }

    /// Helper constructor for parse errors.
    pub fn parse_error(context: impl Into<String>, details: impl Into<String>) -> Self {
        OximeterError::Parse { context: context.into(), details: details.into() }
    }

    /// Helper constructor for worker failures.
    pub fn worker_failed(reason: impl Into<String>) -> Self {
        OximeterError::WorkerFailed { reason: reason.into() }
    }
}

impl From<std::io::Error> for OximeterError {
    fn from(err: std::io::Error) -> Self {
        OximeterError::Io { context: "<unknown>".to_string(), source: err }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn error_messages_carry_their_context(
            reason in ".*",
            context in "\\w+",
            details in ".*",
            mode in "[A-Z][0-9]{1,3}",
            duration_ms in 1u64..60000u64
        ) {
            let config = OximeterError::config_error(reason.clone());
            prop_assert!(config.to_string().contains(&reason));

            let parse = OximeterError::parse_error(context.clone(), details.clone());
            let parse_msg = parse.to_string();
            prop_assert!(parse_msg.contains(&context));
            prop_assert!(parse_msg.contains(&details));

            let unknown = OximeterError::UnknownDataMode { mode: mode.clone() };
            prop_assert!(unknown.to_string().contains(&mode));

            let timeout = OximeterError::Timeout { duration: Duration::from_millis(duration_ms) };
            prop_assert!(!timeout.to_string().is_empty());
        }

        #[test]
        fn io_conversion_preserves_source(message in ".*") {
            let converted: OximeterError = std::io::Error::other(message.clone()).into();
            match converted {
                OximeterError::Io { source, .. } => {
                    prop_assert_eq!(source.to_string(), message);
                }
                _ => prop_assert!(false, "Expected Io error from io::Error conversion"),
            }
        }
    }

    #[test]
    fn error_traits_validation() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<OximeterError>();

        let error = OximeterError::ConsumerClosed;
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn retry_classification() {
        let io = OximeterError::io_error(
            "reading byte",
            std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"),
        );
        assert!(io.is_retryable());
        assert!(!OximeterError::config_error("bad").is_retryable());
        assert!(!OximeterError::ConsumerClosed.is_retryable());
        assert!(OximeterError::Timeout { duration: Duration::from_secs(1) }.is_retryable());
    }

    #[test]
    fn io_error_exposes_source_chain() {
        let io = OximeterError::io_error(
            "reading byte",
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed"),
        );
        let source = std::error::Error::source(&io).expect("io error has a source");
        assert_eq!(source.to_string(), "pipe closed");
    }

    #[test]
    fn every_variant_has_suggestions() {
        let errors = [
            OximeterError::io_error("x", std::io::Error::other("x")),
            OximeterError::config_error("x"),
            OximeterError::parse_error("x", "y"),
            OximeterError::UnknownDataMode { mode: "D9".to_string() },
            OximeterError::ConsumerClosed,
            OximeterError::worker_failed("x"),
            OximeterError::Timeout { duration: Duration::from_millis(5) },
        ];
        for error in &errors {
            let suggestions = error.recovery_suggestions();
            assert!(!suggestions.is_empty(), "{error} has no suggestions");
            for suggestion in suggestions {
                assert!(suggestion.len() > 5);
            }
        }
    }
}
