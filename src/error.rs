//! Error types for timerate.

use thiserror::Error;

/// Main error type for timerate operations.
#[derive(Error, Debug)]
pub enum TimeRateError {
    /// A key was used before `init` was called for it
    #[error("Unknown key: {0}")]
    UnknownKey(String),

    /// Invalid tracker options or an unrecognized unit/mode name
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for timerate operations.
pub type Result<T> = std::result::Result<T, TimeRateError>;
