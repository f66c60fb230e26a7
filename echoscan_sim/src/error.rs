//! Error types for the headless runner.

use echoscan_core::ScanError;
use echoscan_env::EnvError;
use thiserror::Error;

/// Errors that stop a run before it starts.
#[derive(Debug, Error)]
pub enum SimError {
    /// The engine rejected its configuration
    #[error("Engine error: {0}")]
    Engine(#[from] ScanError),

    /// The input boundary failed
    #[error("Environment error: {0}")]
    Env(#[from] EnvError),

    /// Export or replay file I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
