//! Error types for solar computations.

use thiserror::Error;

/// Errors that can occur while planning or computing shadows.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolarError {
    /// A calendar date could not be built.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// A clock time could not be parsed.
    #[error("invalid time '{0}', expected HH:MM")]
    InvalidTime(String),

    /// A numeric input is out of range.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for solar operations.
pub type Result<T> = std::result::Result<T, SolarError>;
