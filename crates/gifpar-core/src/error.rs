//! Error types for gifpar-core.
//!
//! Covers the failure modes of building frames and flattened buffers:
//! bad dimensions, pixel counts that disagree with the geometry, and
//! allocations the system refuses.

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building or indexing frame data.
#[derive(Debug, Error)]
pub enum Error {
    /// Memory allocation failed.
    ///
    /// Buffers are reserved with `try_reserve_exact`, so an impossible
    /// request surfaces here instead of aborting the process.
    #[error("failed to allocate {bytes} bytes for {what}")]
    AllocationFailed {
        /// What the buffer was meant to hold
        what: &'static str,
        /// Bytes requested
        bytes: usize,
    },

    /// Width or height is zero, or their product overflows.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },

    /// Sample or pixel count does not match the declared geometry.
    #[error("buffer size mismatch: expected {expected}, got {actual}")]
    BufferSizeMismatch {
        /// Count implied by the geometry
        expected: usize,
        /// Count actually provided
        actual: usize,
    },

    /// Summed frame sizes do not fit in `usize`.
    #[error("total sample count overflows at frame {frame}")]
    SampleCountOverflow {
        /// Index of the frame whose samples overflowed the total
        frame: usize,
    },

    /// A sequence must contain at least one frame.
    #[error("frame sequence is empty")]
    EmptySequence,

    /// Frame index past the end of the sequence.
    #[error("frame {index} out of range for {count} frame(s)")]
    FrameOutOfRange {
        /// Requested index
        index: usize,
        /// Number of frames
        count: usize,
    },
}
