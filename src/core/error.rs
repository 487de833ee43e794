//! Error types for volsense

use thiserror::Error;

/// Main error type for the sensor
#[derive(Debug, Error)]
pub enum Error {
    /// Rejected configuration. Fatal, surfaced at startup.
    #[error("Config error: {0}")]
    Config(String),

    /// The reference point is undefined (no frame yet, or non-finite).
    #[error("Reference position unavailable")]
    PositionUnavailable,

    /// Host geometry cannot answer line-of-sight queries yet.
    #[error("Line-of-sight geometry unavailable")]
    GeometryUnavailable,

    /// The refresh task ended or could not be joined.
    #[error("Shutdown error: {0}")]
    Shutdown(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for conditions that only skip the current pass.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::PositionUnavailable | Error::GeometryUnavailable)
    }
}
