//! Core error types for belltimer-core.
//!
//! Nothing in the timer core is fatal. Rejected mutations come back as
//! [`TimerError`] and leave the engine untouched, so callers are free to
//! ignore them or surface them as a no-op.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for belltimer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Timer mutation was rejected
    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Rejections raised by the timer state machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// Warning count outside the allowed bounds
    #[error("Invalid warning count {requested}: must be between {min} and {max}")]
    InvalidCount {
        requested: usize,
        min: usize,
        max: usize,
    },

    /// Threshold seconds outside `0..=max`
    #[error("Invalid threshold value {value}: must be between 0 and {max} seconds")]
    InvalidThresholdValue { value: i64, max: u64 },

    /// Warning index does not exist
    #[error("Warning index {index} out of bounds (count: {count})")]
    InvalidIndex { index: usize, count: usize },

    /// Operation not allowed in the current timer phase
    #[error("Cannot {operation} while the timer is running")]
    PreconditionViolation { operation: &'static str },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read or write the configuration file
    #[error("Failed to access configuration at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Failed to serialize configuration
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Home directory could not be determined
    #[error("Could not determine the configuration directory")]
    NoConfigDir,

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
