//! Flattened luminance buffer.
//!
//! [`FlattenedBuffer`] holds every frame's luminance samples back to back,
//! in frame order, together with the [`OffsetTable`] that locates each
//! frame. It is the only representation the filter pipeline and the
//! distribution engine operate on; row access is `row * width + col`
//! inside a frame's range.

use std::ops::Range;

use crate::{Error, FrameGeometry, FrameSequence, OffsetTable, Result, Rgb};

/// All frames' luminance samples in one contiguous array.
#[derive(Debug, Clone, PartialEq)]
pub struct FlattenedBuffer {
    samples: Vec<i32>,
    offsets: OffsetTable,
    geometry: Vec<FrameGeometry>,
}

impl FlattenedBuffer {
    /// Flattens a sequence, reducing every pixel to its luma.
    ///
    /// The sample storage is reserved up front; if the allocator refuses,
    /// [`Error::AllocationFailed`] is returned and nothing is built.
    pub fn from_sequence(sequence: &FrameSequence) -> Result<Self> {
        let geometry = sequence.geometry();
        let offsets = OffsetTable::from_geometry(&geometry)?;
        let mut samples = try_alloc(offsets.total())?;
        for frame in sequence.frames() {
            samples.extend(frame.pixels.iter().map(Rgb::luma));
        }
        Ok(Self { samples, offsets, geometry })
    }

    /// Wraps existing samples, checking them against the geometry.
    pub fn from_samples(samples: Vec<i32>, geometry: Vec<FrameGeometry>) -> Result<Self> {
        let offsets = OffsetTable::from_geometry(&geometry)?;
        if samples.len() != offsets.total() {
            return Err(Error::BufferSizeMismatch {
                expected: offsets.total(),
                actual: samples.len(),
            });
        }
        Ok(Self { samples, offsets, geometry })
    }

    /// Writes the samples back as gray pixels, frame by frame.
    ///
    /// The sequence must have the geometry this buffer was built from.
    pub fn write_back(&self, sequence: &mut FrameSequence) -> Result<()> {
        if sequence.geometry() != self.geometry {
            return Err(Error::BufferSizeMismatch {
                expected: self.samples.len(),
                actual: sequence.frames().iter().map(|f| f.pixels.len()).sum(),
            });
        }
        for (index, frame) in sequence.frames_mut().iter_mut().enumerate() {
            let range = self.offsets.frame_range(index)?;
            for (px, &v) in frame.pixels.iter_mut().zip(&self.samples[range]) {
                *px = Rgb::gray(v);
            }
        }
        Ok(())
    }

    /// Number of frames.
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.geometry.len()
    }

    /// Per-frame geometry.
    pub fn geometry(&self) -> &[FrameGeometry] {
        &self.geometry
    }

    /// The offset table.
    pub fn offsets(&self) -> &OffsetTable {
        &self.offsets
    }

    /// All samples.
    pub fn samples(&self) -> &[i32] {
        &self.samples
    }

    /// All samples, mutably.
    pub fn samples_mut(&mut self) -> &mut [i32] {
        &mut self.samples
    }

    /// Samples of frame `index`.
    pub fn frame(&self, index: usize) -> Result<&[i32]> {
        let range = self.offsets.frame_range(index)?;
        Ok(&self.samples[range])
    }

    /// Samples of frame `index`, mutably.
    pub fn frame_mut(&mut self, index: usize) -> Result<&mut [i32]> {
        let range = self.offsets.frame_range(index)?;
        Ok(&mut self.samples[range])
    }

    /// Samples in `range`, mutably. The range must lie inside the buffer.
    pub fn slice_mut(&mut self, range: Range<usize>) -> Result<&mut [i32]> {
        let total = self.samples.len();
        if range.start > range.end || range.end > total {
            return Err(Error::BufferSizeMismatch {
                expected: total,
                actual: range.end,
            });
        }
        Ok(&mut self.samples[range])
    }

    /// Consumes the buffer, returning its samples.
    pub fn into_samples(self) -> Vec<i32> {
        self.samples
    }
}

fn try_alloc(len: usize) -> Result<Vec<i32>> {
    let mut samples = Vec::new();
    samples.try_reserve_exact(len).map_err(|_| Error::AllocationFailed {
        what: "flattened frame buffer",
        bytes: len.saturating_mul(std::mem::size_of::<i32>()),
    })?;
    Ok(samples)
}
