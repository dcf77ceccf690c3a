//! Error types for contour extraction.

use thiserror::Error;

/// Errors that can occur while building a contour map.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContourError {
    /// Grid dimensions or sampling parameters are unusable.
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    /// Invalid contour settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

/// Result type for contour operations.
pub type Result<T> = std::result::Result<T, ContourError>;
