//! Error types for the EchoScan boundary layer.

use thiserror::Error;

/// Errors that can occur at the I/O boundary.
#[derive(Debug, Error)]
pub enum EnvError {
    /// A sensor line could not be turned into a reading
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// The other end of the reading channel is gone
    #[error("Reading channel closed")]
    ChannelClosed,

    /// The reading channel is at capacity
    #[error("Reading channel full")]
    ChannelFull,

    /// Reading the input source failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EnvError {
    /// Creates a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::DecodeError(msg.into())
    }
}
