//! Error types for geometry and path data.

use thiserror::Error;

/// Errors that can occur while reading path data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeomError {
    /// Path data could not be tokenized or is structurally invalid.
    #[error("malformed path data: {0}")]
    Parse(String),
}

/// Result type for geometry operations.
pub type Result<T> = std::result::Result<T, GeomError>;
