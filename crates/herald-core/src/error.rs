//! Error types for notification controller construction and configuration

use thiserror::Error;

/// Controller errors
///
/// Only building a controller (or loading its configuration) can fail.
/// Operations on notification ids never return an error.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Stacked mode configured with no slots
    #[error("Invalid capacity: max_concurrent must be at least 1, got {0}")]
    InvalidCapacity(usize),

    /// Event channel configured with no buffer
    #[error("Invalid event capacity: must be at least 1, got {0}")]
    InvalidEventCapacity(usize),

    /// A named duration resolves to zero
    #[error("Invalid duration for {field}: {value}ms")]
    InvalidDuration {
        /// Name of the offending config field
        field: &'static str,
        /// The configured value in milliseconds
        value: u64,
    },

    /// No tokio runtime to schedule timers on
    #[error("No async runtime available: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),

    /// IO error while reading configuration
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed configuration
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for controller construction
pub type Result<T> = std::result::Result<T, ControllerError>;
