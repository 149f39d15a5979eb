//! Error types for file operations.

use std::io;
use thiserror::Error;

/// I/O operation error.
#[derive(Debug, Error)]
pub enum IoError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The frames could not be encoded.
    #[error("encode error: {0}")]
    Encode(String),

    /// The file uses something the codec does not handle.
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    /// Decoded data violates a frame invariant.
    #[error(transparent)]
    Core(#[from] gifpar_core::Error),
}

/// Result type for file operations.
pub type IoResult<T> = Result<T, IoError>;
