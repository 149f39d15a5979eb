//! Error types for filter kernels.

use thiserror::Error;

/// Error type for filter kernels.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Buffer length and frame dimensions disagree, or a dimension is zero.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for filter kernels.
pub type OpsResult<T> = Result<T, OpsError>;
