//! Error types for lct-gun.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias.
pub type Result<T> = std::result::Result<T, GunError>;

/// Muon gun errors.
#[derive(Error, Debug)]
pub enum GunError {
    /// The output file already exists; event files are never overwritten.
    #[error("output file already exists: {}", .0.display())]
    OutputExists(PathBuf),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow array or schema error.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet encoding or decoding error.
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Configuration metadata (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration or malformed event file.
    #[error("validation error: {0}")]
    Validation(String),
}
