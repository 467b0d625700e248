//! Error type for ROOT file reading and histogram filling.

use thiserror::Error;

/// Errors produced while reading ROOT files or filling histograms from them.
#[derive(Debug, Error)]
pub enum RootError {
    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file does not start with the `root` magic bytes.
    #[error("not a ROOT file (bad magic)")]
    BadMagic,

    /// A key was not found in a directory.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// A tree was not found, or the key is not a `TTree`.
    #[error("tree not found: {0}")]
    TreeNotFound(String),

    /// A branch was not found in a tree.
    #[error("branch not found: {0}")]
    BranchNotFound(String),

    /// Attempted to read past the end of a buffer.
    #[error("buffer underflow at offset {offset}: need {need} bytes, have {have}")]
    BufferUnderflow {
        /// Read position.
        offset: usize,
        /// Bytes requested.
        need: usize,
        /// Bytes available.
        have: usize,
    },

    /// A compressed block could not be decoded.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// Streamed object data did not match the expected layout.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Class is not supported by this reader.
    #[error("unsupported class: {0}")]
    UnsupportedClass(String),

    /// Data type does not support the requested access.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// Expression parse failure.
    #[error("expression error: {0}")]
    Expression(String),

    /// Histogram request or fill failure.
    #[error("histogram fill error: {0}")]
    HistogramFill(String),
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, RootError>;
