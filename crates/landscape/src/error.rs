//! Error types for drafting operations.

use landscape_contour::ContourError;
use landscape_geom::GeomError;
use landscape_solar::SolarError;
use thiserror::Error;

/// Errors that can occur while running a drafting operation.
///
/// `InvalidSelection` and `MissingPrerequisite` are always raised before
/// the document is touched or any data is fetched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LandscapeError {
    /// No shape selected, or a shape of the wrong kind.
    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    /// A parameter is out of range or malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Document metadata or a layer the operation needs is absent.
    #[error("missing prerequisite: {0}")]
    MissingPrerequisite(String),

    /// The value is already set and no override was requested.
    #[error("{0} already exists")]
    AlreadyExists(String),

    /// An external data request failed.
    #[error("external fetch failed: {0}")]
    ExternalFetchFailure(String),

    /// An external service answered with an unexpected payload.
    #[error("malformed external data: {0}")]
    MalformedExternalData(String),

    /// Path data could not be read.
    #[error(transparent)]
    Geometry(#[from] GeomError),

    /// Contour extraction rejected its input.
    #[error(transparent)]
    Contour(#[from] ContourError),

    /// Solar planning rejected its input.
    #[error(transparent)]
    Solar(#[from] SolarError),
}

/// Failure reported by a [`DataFetcher`](crate::fetch::DataFetcher).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// The request did not complete.
    #[error("request failed: {0}")]
    Transport(String),

    /// The response arrived but could not be understood.
    #[error("unexpected response: {0}")]
    Malformed(String),
}

impl From<FetchError> for LandscapeError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Transport(msg) => LandscapeError::ExternalFetchFailure(msg),
            FetchError::Malformed(msg) => LandscapeError::MalformedExternalData(msg),
        }
    }
}

/// Result type for drafting operations.
pub type Result<T> = std::result::Result<T, LandscapeError>;
