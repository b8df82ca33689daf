//! Error types for the delivery-window pipeline
//!
//! Every variant is fatal: the pipeline stops at the first error and hands it
//! back to the caller, which decides how to report it.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, aggregating or writing
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to open input file {path:?}: {source}")]
    SourceOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {origin} at line {line}: {source}")]
    Read {
        origin: String,
        line: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON in {origin} at line {line}: {source}")]
    Decode {
        origin: String,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse timestamp {value:?} of event {index}: {source}")]
    Timestamp {
        value: String,
        index: usize,
        #[source]
        source: TimestampError,
    },

    #[error("Invalid window size: {0} (must be >= 1 minute)")]
    InvalidWindow(u32),

    #[error("Timestamp out of range while stepping from {0}")]
    TimeOutOfRange(String),

    #[error("Failed to create output file {path:?}: {source}")]
    DestinationCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output: {0}")]
    Write(#[from] std::io::Error),

    #[error("Failed to serialize output point: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Why a timestamp was rejected
#[derive(Error, Debug)]
pub enum TimestampError {
    #[error("expected layout YYYY-MM-DD HH:MM:SS.ffffff")]
    Layout,

    #[error("leap seconds are not accepted")]
    LeapSecond,

    #[error("{0}")]
    Invalid(#[from] chrono::ParseError),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_window_message() {
        let err = Error::InvalidWindow(0);
        assert_eq!(
            err.to_string(),
            "Invalid window size: 0 (must be >= 1 minute)"
        );
    }

    #[test]
    fn test_timestamp_error_names_layout() {
        let err = Error::Timestamp {
            value: "2018-12-26 18:11:08".to_string(),
            index: 0,
            source: TimestampError::Layout,
        };
        assert!(err.to_string().contains("YYYY-MM-DD HH:MM:SS.ffffff"));
    }

    #[test]
    fn test_io_error_converts_to_write() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: Error = io.into();
        assert!(matches!(err, Error::Write(_)));
        assert!(err.to_string().contains("pipe closed"));
    }
}
