//! # gifpar-core
//!
//! Core types shared by every gifpar crate.
//!
//! - [`Rgb`] - decoded 8-bit pixel with the luma reduction used by the pipeline
//! - [`Frame`], [`FrameSequence`] - decoded frames as handed over by the codec
//! - [`FrameGeometry`] - width/height pair broadcast to workers
//! - [`OffsetTable`] - frame index to sample offset mapping
//! - [`FlattenedBuffer`] - all frames' luminance samples in one contiguous array
//!
//! ## Crate Structure
//!
//! ```text
//! gifpar-core (this crate)
//!    ^
//!    +-- gifpar-ops (filter kernels)
//!    +-- gifpar-compute (partitioning, scheduling, distribution)
//!    +-- gifpar-io (codec, synthetic frames, run log)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod buffer;
pub mod error;
pub mod frame;
pub mod offsets;
pub mod pixel;

pub use buffer::FlattenedBuffer;
pub use error::{Error, Result};
pub use frame::{Frame, FrameGeometry, FrameSequence};
pub use offsets::OffsetTable;
pub use pixel::Rgb;
