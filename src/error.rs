//! Custom error types for the sweep acquisition stack.
//!
//! All fallible operations in this crate return [`SweepError`] through the
//! crate-wide [`Result`] alias. The taxonomy separates transport failures
//! (connection gone), caller programming errors (protocol misuse), device
//! failures (malformed replies, averaging that never completes), and
//! configuration problems. Nothing is retried internally; every error
//! propagates to the caller.

use std::time::Duration;
use thiserror::Error;

/// Convenience alias for results using the crate error type.
pub type Result<T> = std::result::Result<T, SweepError>;

/// Errors produced by transports, the SCPI codec, and acquisition.
#[derive(Error, Debug)]
pub enum SweepError {
    /// Operation attempted on a transport after `close()`.
    #[error("Connection closed")]
    ConnectionClosed,

    /// The transport could not be established or was lost.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Underlying I/O failure on an open transport.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Command-only call given the query sentinel, or query-only call given a
    /// value. A programming error, never a device fault.
    #[error("Protocol misuse: {0}")]
    ProtocolMisuse(String),

    /// Instrument reply could not be parsed as the expected data.
    #[error("Malformed instrument reply: {0}")]
    Parse(String),

    /// The averaging-completion poll exceeded its bound.
    #[error("Averaging did not complete after {polls} polls ({waited:?})")]
    AcquisitionTimeout {
        /// Number of completion polls issued before giving up.
        polls: u32,
        /// Total time spent waiting.
        waited: Duration,
    },

    /// Measurement and reference traces disagree in length.
    #[error("Measurement trace has {measurement} points but reference has {reference}")]
    TraceLength {
        /// Point count of the measurement trace.
        measurement: usize,
        /// Point count of the reference trace.
        reference: usize,
    },

    /// A per-segment setting vector is neither length 1 nor segment count.
    #[error("Setting '{name}' has {got} values, expected 1 or {expected}")]
    SettingsLength {
        /// Name of the offending setting.
        name: &'static str,
        /// Number of scan segments.
        expected: usize,
        /// Length actually supplied.
        got: usize,
    },

    /// Parameter name not present in the instrument's parameter table.
    #[error("Unknown instrument parameter '{0}'")]
    UnknownParameter(String),

    /// Configuration loading or validation failure.
    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    /// Logging subscriber could not be installed.
    #[error("Telemetry setup failed: {0}")]
    Telemetry(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_names_poll_count() {
        let err = SweepError::AcquisitionTimeout {
            polls: 600,
            waited: Duration::from_secs(600),
        };
        assert!(err.to_string().contains("600 polls"));
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        let err: SweepError = io.into();
        assert!(matches!(err, SweepError::Io(_)));
    }
}
