//! Spatial partitioning of a single frame.
//!
//! A frame is cut into patches. With a perfect-square patch count of at
//! least 4 the cut is a `k x k` grid; otherwise it is a row of vertical
//! column bands. In both cases the remainder of an uneven split goes to the
//! last band of that dimension.
//!
//! Extracted patches carry a 1-pixel halo:
//!
//! ```text
//!  c t t t c      t/b/l/r  edge row/column of the neighbouring patch
//!  l . . . r      c        diagonal neighbour sample
//!  l . . . r      .        patch core
//!  c b b b c
//! ```
//!
//! A halo side is filled only when a neighbour exists on that side; at the
//! frame boundary it stays zero. Corner samples are filled when both
//! adjoining sides are, which is what lets a 3x3 kernel on the padded patch
//! reproduce the whole-frame result at every frame-interior pixel.

use gifpar_core::Error as CoreError;
use rayon::prelude::*;
use tracing::debug;

use crate::backend::FilterBackend;
use crate::{ComputeError, ComputeResult};

/// Core region of one patch, in frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
    /// Grid row (always 0 for column bands).
    pub row: usize,
    /// Grid column.
    pub col: usize,
}

/// Which halo sides hold neighbour data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HaloSides {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

/// A patch copied out of a frame, padded by one sample on every side.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialPatch {
    rect: PatchRect,
    halo: HaloSides,
    samples: Vec<i32>,
}

impl SpatialPatch {
    /// Core rectangle.
    pub fn rect(&self) -> &PatchRect {
        &self.rect
    }

    /// Filled halo sides.
    pub fn halo(&self) -> HaloSides {
        self.halo
    }

    /// `width + 2`.
    pub fn padded_width(&self) -> usize {
        self.rect.width + 2
    }

    /// `height + 2`.
    pub fn padded_height(&self) -> usize {
        self.rect.height + 2
    }

    /// Padded samples, row-major.
    pub fn samples(&self) -> &[i32] {
        &self.samples
    }

    /// Padded samples, mutably.
    pub fn samples_mut(&mut self) -> &mut [i32] {
        &mut self.samples
    }

    /// Padded sample at `(row, col)`, halo included.
    pub fn padded(&self, row: usize, col: usize) -> i32 {
        self.samples[row * self.padded_width() + col]
    }

    /// Core rows, without halo.
    pub fn core(&self) -> impl Iterator<Item = &[i32]> {
        let pw = self.padded_width();
        let w = self.rect.width;
        self.samples
            .chunks_exact(pw)
            .skip(1)
            .take(self.rect.height)
            .map(move |row| &row[1..=w])
    }
}

/// Patch geometry for one frame size and patch count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchLayout {
    width: usize,
    height: usize,
    rows: usize,
    cols: usize,
    grid: bool,
    rects: Vec<PatchRect>,
}

impl PatchLayout {
    /// Computes the layout for `n_patches` patches.
    pub fn new(width: usize, height: usize, n_patches: usize) -> ComputeResult<Self> {
        if n_patches == 0 {
            return Err(ComputeError::InvalidPartition("patch count must be positive".into()));
        }
        let side = n_patches.isqrt();
        let grid = n_patches >= 4 && side * side == n_patches;
        let (rows, cols) = if grid { (side, side) } else { (1, n_patches) };

        let xs = bands(width, cols).ok_or_else(|| {
            ComputeError::InvalidPartition(format!("width {} cannot hold {} column bands", width, cols))
        })?;
        let ys = bands(height, rows).ok_or_else(|| {
            ComputeError::InvalidPartition(format!("height {} cannot hold {} row bands", height, rows))
        })?;

        let mut rects = Vec::with_capacity(rows * cols);
        for (row, &(y, h)) in ys.iter().enumerate() {
            for (col, &(x, w)) in xs.iter().enumerate() {
                rects.push(PatchRect { x, y, width: w, height: h, row, col });
            }
        }

        debug!(width, height, n_patches, rows, cols, grid, "patch layout");
        Ok(Self { width, height, rows, cols, grid, rects })
    }

    /// Number of patches.
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    /// Never true for a constructed layout.
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Whether the square grid was used (as opposed to column bands).
    pub fn is_grid(&self) -> bool {
        self.grid
    }

    /// `(rows, cols)` of the layout.
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// All patch rectangles, row-major.
    pub fn rects(&self) -> &[PatchRect] {
        &self.rects
    }

    fn check_frame(&self, len: usize) -> ComputeResult<()> {
        let expected = self.width * self.height;
        if len != expected {
            return Err(CoreError::BufferSizeMismatch { expected, actual: len }.into());
        }
        Ok(())
    }

    /// Copies patch `index` out of `frame` with its halo.
    pub fn extract(&self, frame: &[i32], index: usize) -> ComputeResult<SpatialPatch> {
        self.check_frame(frame.len())?;
        let rect = *self.rects.get(index).ok_or_else(|| {
            ComputeError::InvalidPartition(format!("patch {} out of {}", index, self.rects.len()))
        })?;

        let halo = HaloSides {
            top: rect.y > 0,
            bottom: rect.y + rect.height < self.height,
            left: rect.x > 0,
            right: rect.x + rect.width < self.width,
        };

        let pw = rect.width + 2;
        let ph = rect.height + 2;
        let mut samples = vec![0i32; pw * ph];

        // Frame columns to copy, and where they land in the padded row.
        let fx_start = if halo.left { rect.x - 1 } else { rect.x };
        let fx_end = if halo.right { rect.x + rect.width + 1 } else { rect.x + rect.width };
        let pc_start = if halo.left { 0 } else { 1 };
        let span = fx_end - fx_start;

        for pr in 0..ph {
            // Padded row `pr` maps to frame row `rect.y + pr - 1`.
            let Some(fy) = (rect.y + pr).checked_sub(1) else { continue };
            if fy >= self.height {
                continue;
            }
            let src = &frame[fy * self.width + fx_start..fy * self.width + fx_end];
            let dst = pr * pw + pc_start;
            samples[dst..dst + span].copy_from_slice(src);
        }

        Ok(SpatialPatch { rect, halo, samples })
    }

    /// Writes a patch core back into `frame`.
    ///
    /// With `interior_only`, samples on the frame's outer ring are skipped.
    pub fn stitch(&self, frame: &mut [i32], patch: &SpatialPatch, interior_only: bool) -> ComputeResult<()> {
        self.check_frame(frame.len())?;
        let rect = patch.rect;
        if rect.x + rect.width > self.width || rect.y + rect.height > self.height {
            return Err(ComputeError::InvalidPartition(format!(
                "patch {:?} does not fit a {}x{} frame",
                rect, self.width, self.height
            )));
        }

        let col_lo = usize::from(interior_only && rect.x == 0);
        let col_hi = rect.width - usize::from(interior_only && rect.x + rect.width == self.width);
        if col_lo >= col_hi {
            return Ok(());
        }

        for (r, core_row) in patch.core().enumerate() {
            let fy = rect.y + r;
            if interior_only && (fy == 0 || fy + 1 == self.height) {
                continue;
            }
            let dst = fy * self.width + rect.x;
            frame[dst + col_lo..dst + col_hi].copy_from_slice(&core_row[col_lo..col_hi]);
        }
        Ok(())
    }
}

/// Splits `len` into `n` bands; the last one takes the remainder.
fn bands(len: usize, n: usize) -> Option<Vec<(usize, usize)>> {
    let base = len / n;
    if base == 0 {
        return None;
    }
    Some(
        (0..n)
            .map(|i| {
                let extra = if i + 1 == n { len % n } else { 0 };
                (i * base, base + extra)
            })
            .collect(),
    )
}

/// Sobel over a frame split into `n_patches` patches processed in parallel.
///
/// Only frame-interior samples are stitched back, so the result equals a
/// whole-frame Sobel.
pub fn sobel_by_patches(
    frame: &mut [i32],
    width: usize,
    height: usize,
    n_patches: usize,
    backend: &dyn FilterBackend,
) -> ComputeResult<()> {
    let layout = PatchLayout::new(width, height, n_patches)?;
    let mut patches = (0..layout.len())
        .map(|i| layout.extract(frame, i))
        .collect::<ComputeResult<Vec<_>>>()?;

    patches.par_iter_mut().try_for_each(|patch| {
        let (pw, ph) = (patch.padded_width(), patch.padded_height());
        backend.sobel(patch.samples_mut(), pw, ph)
    })?;

    for patch in &patches {
        layout.stitch(frame, patch, true)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CpuBackend;

    fn noise(width: usize, height: usize) -> Vec<i32> {
        (0..width * height).map(|i| ((i * 7919 + 13) % 256) as i32).collect()
    }

    #[test]
    fn test_grid_layout() {
        let layout = PatchLayout::new(10, 7, 4).unwrap();
        assert!(layout.is_grid());
        assert_eq!(layout.dims(), (2, 2));
        let r = layout.rects();
        assert_eq!((r[0].x, r[0].y, r[0].width, r[0].height), (0, 0, 5, 3));
        assert_eq!((r[3].x, r[3].y, r[3].width, r[3].height), (5, 3, 5, 4));
        assert_eq!((r[3].row, r[3].col), (1, 1));
    }

    #[test]
    fn test_column_fallback() {
        for n in [2, 3, 5] {
            let layout = PatchLayout::new(10, 7, n).unwrap();
            assert!(!layout.is_grid());
            assert!(layout.rects().iter().all(|r| r.height == 7 && r.y == 0));
        }
        let widths: Vec<_> = PatchLayout::new(10, 7, 3).unwrap().rects().iter().map(|r| r.width).collect();
        assert_eq!(widths, vec![3, 3, 4]);
    }

    #[test]
    fn test_invalid_layout() {
        assert!(PatchLayout::new(10, 10, 0).is_err());
        assert!(PatchLayout::new(3, 10, 4).is_ok());
        assert!(PatchLayout::new(1, 10, 4).is_err());
        assert!(PatchLayout::new(10, 2, 9).is_err());
    }

    #[test]
    fn test_cores_tile_frame() {
        for (w, h, n) in [(10, 7, 4), (17, 13, 9), (11, 5, 3), (8, 8, 1), (16, 9, 16)] {
            let layout = PatchLayout::new(w, h, n).unwrap();
            let mut hits = vec![0u32; w * h];
            for r in layout.rects() {
                for y in r.y..r.y + r.height {
                    for x in r.x..r.x + r.width {
                        hits[y * w + x] += 1;
                    }
                }
            }
            assert!(hits.iter().all(|&c| c == 1), "{}x{} / {}", w, h, n);
        }
    }

    #[test]
    fn test_halo_matches_neighbours() {
        let (w, h) = (12, 9);
        let frame = noise(w, h);
        let layout = PatchLayout::new(w, h, 9).unwrap();

        for i in 0..layout.len() {
            let patch = layout.extract(&frame, i).unwrap();
            let r = *patch.rect();
            for pr in 0..patch.padded_height() {
                for pc in 0..patch.padded_width() {
                    let fy = (r.y + pr) as isize - 1;
                    let fx = (r.x + pc) as isize - 1;
                    let inside = fy >= 0 && fx >= 0 && (fy as usize) < h && (fx as usize) < w;
                    let expected = if inside { frame[fy as usize * w + fx as usize] } else { 0 };
                    assert_eq!(patch.padded(pr, pc), expected, "patch {} at ({}, {})", i, pr, pc);
                }
            }
        }
    }

    #[test]
    fn test_halo_sides() {
        let frame = noise(9, 9);
        let layout = PatchLayout::new(9, 9, 9).unwrap();
        let corner = layout.extract(&frame, 0).unwrap();
        assert_eq!(corner.halo(), HaloSides { top: false, bottom: true, left: false, right: true });
        let centre = layout.extract(&frame, 4).unwrap();
        assert_eq!(centre.halo(), HaloSides { top: true, bottom: true, left: true, right: true });
        // Missing sides stay zero.
        assert!((0..corner.padded_width()).all(|c| corner.padded(0, c) == 0));
    }

    #[test]
    fn test_core_and_stitch() {
        let (w, h) = (10, 6);
        let frame = noise(w, h);
        let layout = PatchLayout::new(w, h, 4).unwrap();
        let patch = layout.extract(&frame, 1).unwrap();

        let first: Vec<i32> = patch.core().next().unwrap().to_vec();
        assert_eq!(first, frame[5..10].to_vec());
        assert_eq!(patch.core().count(), 3);

        let mut out = vec![0; w * h];
        for i in 0..layout.len() {
            let p = layout.extract(&frame, i).unwrap();
            layout.stitch(&mut out, &p, false).unwrap();
        }
        assert_eq!(out, frame);
    }

    #[test]
    fn test_patch_sobel_equals_full_frame() {
        let (w, h) = (23, 17);
        let mut expected = noise(w, h);
        gifpar_ops::sobel::sobel(&mut expected, w, h).unwrap();

        for n in [1, 2, 4, 9] {
            let mut frame = noise(w, h);
            sobel_by_patches(&mut frame, w, h, n, &CpuBackend::new()).unwrap();
            assert_eq!(frame, expected, "{} patches", n);
        }
    }

    #[test]
    fn test_extract_rejects_wrong_frame() {
        let layout = PatchLayout::new(4, 4, 1).unwrap();
        assert!(layout.extract(&[0; 15], 0).is_err());
        assert!(layout.extract(&[0; 16], 1).is_err());
    }
}
