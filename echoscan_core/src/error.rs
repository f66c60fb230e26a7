//! Error types for the EchoScan core.

use thiserror::Error;

/// Errors raised by the scan engine and its components.
///
/// Buffer overflow is deliberately absent: the FIFO eviction policy
/// handles it and it is never reported as a failure.
#[derive(Debug, Error)]
pub enum ScanError {
    /// A reading failed boundary validation (non-positive or non-finite
    /// distance, heading outside [0, 360)). Dropped and counted, never fatal.
    #[error("Invalid reading: {0}")]
    InvalidReading(String),

    /// The configuration is unusable. Raised at construction time.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Reading a configuration file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file was not valid JSON for `ScanConfig`
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ScanError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates an invalid-reading error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidReading(msg.into())
    }

    /// Returns true for errors that must stop construction.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::InvalidReading(_))
    }
}

/// Result alias used throughout the core.
pub type ScanResult<T> = Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_reading_not_fatal() {
        assert!(!ScanError::invalid("distance -5").is_fatal());
        assert!(ScanError::config("max_points must be positive").is_fatal());
    }

    #[test]
    fn test_error_display() {
        let err = ScanError::config("gradient must end at 1.0");
        assert_eq!(err.to_string(), "Configuration error: gradient must end at 1.0");
    }
}
