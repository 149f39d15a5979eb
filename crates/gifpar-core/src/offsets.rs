//! Frame offset table.
//!
//! Maps a frame index to the first sample of that frame inside a
//! [`FlattenedBuffer`](crate::FlattenedBuffer), with a trailing sentinel
//! equal to the total sample count:
//!
//! ```text
//! frames:   [ 4x4 ][ 4x4 ][ 4x4 ]
//! offsets:  0      16     32     48
//! ```
//!
//! `offset[i + 1] - offset[i] == width[i] * height[i]` always holds, so the
//! sample range of frames `[first, first + count)` is
//! `offset[first]..offset[first + count]`.

use std::ops::Range;

use crate::{Error, FrameGeometry, Result};

/// Cumulative sample offsets for a list of frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetTable {
    offsets: Vec<usize>,
}

impl OffsetTable {
    /// Builds the table from frame geometries.
    ///
    /// Fails with [`Error::SampleCountOverflow`] when the running total
    /// does not fit in `usize`.
    pub fn from_geometry(geometry: &[FrameGeometry]) -> Result<Self> {
        let mut offsets = Vec::with_capacity(geometry.len() + 1);
        let mut current = 0usize;
        for (frame, g) in geometry.iter().enumerate() {
            offsets.push(current);
            current = current
                .checked_add(g.samples())
                .ok_or(Error::SampleCountOverflow { frame })?;
        }
        offsets.push(current);
        Ok(Self { offsets })
    }

    /// Number of frames covered (the sentinel is not a frame).
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Total number of samples (the sentinel).
    #[inline]
    pub fn total(&self) -> usize {
        self.offsets[self.offsets.len() - 1]
    }

    /// Offset of frame `index`; `index == frame_count()` yields the sentinel.
    pub fn offset(&self, index: usize) -> Result<usize> {
        self.offsets.get(index).copied().ok_or(Error::FrameOutOfRange {
            index,
            count: self.frame_count(),
        })
    }

    /// Sample range of a single frame.
    pub fn frame_range(&self, index: usize) -> Result<Range<usize>> {
        self.slice_range(index, 1)
    }

    /// Sample range covering frames `[first, first + count)`.
    pub fn slice_range(&self, first: usize, count: usize) -> Result<Range<usize>> {
        let end = first.checked_add(count).ok_or(Error::FrameOutOfRange {
            index: usize::MAX,
            count: self.frame_count(),
        })?;
        if end > self.frame_count() {
            return Err(Error::FrameOutOfRange { index: end, count: self.frame_count() });
        }
        Ok(self.offsets[first]..self.offsets[end])
    }

    /// Raw offsets including the sentinel.
    pub fn as_slice(&self) -> &[usize] {
        &self.offsets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geo(dims: &[(u32, u32)]) -> Vec<FrameGeometry> {
        dims.iter().map(|&(w, h)| FrameGeometry::new(w, h).unwrap()).collect()
    }

    #[test]
    fn test_uniform_frames() {
        let table = OffsetTable::from_geometry(&geo(&[(4, 4), (4, 4), (4, 4)])).unwrap();
        assert_eq!(table.as_slice(), &[0, 16, 32, 48]);
        assert_eq!(table.total(), 48);
        assert_eq!(table.frame_count(), 3);
    }

    #[test]
    fn test_mixed_frames_sum() {
        let dims = [(3, 7), (10, 1), (1, 1), (64, 48)];
        let table = OffsetTable::from_geometry(&geo(&dims)).unwrap();
        let mut sum = 0;
        for (i, &(w, h)) in dims.iter().enumerate() {
            assert_eq!(table.offset(i).unwrap(), sum);
            sum += (w * h) as usize;
        }
        assert_eq!(table.total(), sum);
        assert!(table.as_slice().windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_slice_range() {
        let table = OffsetTable::from_geometry(&geo(&[(4, 4), (2, 2), (4, 4)])).unwrap();
        assert_eq!(table.slice_range(0, 2).unwrap(), 0..20);
        assert_eq!(table.slice_range(2, 1).unwrap(), 20..36);
        assert_eq!(table.frame_range(1).unwrap(), 16..20);
        assert_eq!(table.slice_range(3, 0).unwrap(), 36..36);
        assert!(table.slice_range(2, 2).is_err());
    }

    #[test]
    fn test_empty_geometry() {
        let table = OffsetTable::from_geometry(&[]).unwrap();
        assert_eq!(table.frame_count(), 0);
        assert_eq!(table.total(), 0);
    }

    #[test]
    fn test_total_overflow_rejected() {
        let side = FrameGeometry::new(u32::MAX, u32::MAX).unwrap();
        let frames = usize::MAX / side.samples() + 1;
        let err = OffsetTable::from_geometry(&vec![side; frames]).unwrap_err();
        assert!(matches!(err, Error::SampleCountOverflow { frame } if frame == frames - 1));
    }
}
