//! Frames and frame sequences.
//!
//! A [`FrameSequence`] is what the codec loads and saves: an ordered list of
//! RGB frames, each with its own geometry. The invariant
//! `pixels.len() == width * height` is checked on construction.

use crate::{Error, Result, Rgb};

/// Width and height of one frame.
///
/// This is the only per-frame information a worker needs besides its
/// samples, so it is what gets broadcast alongside a slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameGeometry {
    /// Creates a geometry, rejecting zero or overflowing dimensions.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        (width as usize)
            .checked_mul(height as usize)
            .ok_or(Error::InvalidDimensions { width, height })?;
        Ok(Self { width, height })
    }

    /// Number of samples (`width * height`).
    #[inline]
    pub fn samples(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// One decoded frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major pixels.
    pub pixels: Vec<Rgb>,
    /// Display delay in milliseconds (0 when the source has none).
    pub delay_ms: u32,
}

impl Frame {
    /// Creates a frame, checking the pixel count against the geometry.
    pub fn new(width: u32, height: u32, pixels: Vec<Rgb>) -> Result<Self> {
        let geometry = FrameGeometry::new(width, height)?;
        if pixels.len() != geometry.samples() {
            return Err(Error::BufferSizeMismatch {
                expected: geometry.samples(),
                actual: pixels.len(),
            });
        }
        Ok(Self { width, height, pixels, delay_ms: 0 })
    }

    /// Frame filled with a single gray level.
    pub fn filled(width: u32, height: u32, value: i32) -> Result<Self> {
        let geometry = FrameGeometry::new(width, height)?;
        Self::new(width, height, vec![Rgb::gray(value); geometry.samples()])
    }

    /// Sets the display delay.
    pub fn with_delay(mut self, delay_ms: u32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Geometry of this frame.
    #[inline]
    pub fn geometry(&self) -> FrameGeometry {
        FrameGeometry { width: self.width, height: self.height }
    }
}

/// Ordered, non-empty list of frames.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSequence {
    frames: Vec<Frame>,
}

impl FrameSequence {
    /// Wraps a list of frames. The list must not be empty.
    pub fn new(frames: Vec<Frame>) -> Result<Self> {
        if frames.is_empty() {
            return Err(Error::EmptySequence);
        }
        Ok(Self { frames })
    }

    /// Number of frames.
    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false for a constructed sequence; kept for API symmetry.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// All frames.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// All frames, mutably. Geometry must not be changed through this.
    pub fn frames_mut(&mut self) -> &mut [Frame] {
        &mut self.frames
    }

    /// Frame at `index`.
    pub fn frame(&self, index: usize) -> Result<&Frame> {
        self.frames.get(index).ok_or(Error::FrameOutOfRange {
            index,
            count: self.frames.len(),
        })
    }

    /// Geometry of every frame, in order.
    pub fn geometry(&self) -> Vec<FrameGeometry> {
        self.frames.iter().map(Frame::geometry).collect()
    }

    /// Consumes the sequence, returning its frames.
    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}
