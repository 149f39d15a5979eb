//! Thresholded Sobel edge detection.
//!
//! For every interior pixel the horizontal and vertical gradients are taken
//! over the 8-neighbourhood:
//!
//! ```text
//! dx = -NW + NE - 2W + 2E - SW + SE
//! dy =  SE + 2S + SW - NE - 2N - NW
//! ```
//!
//! The pixel becomes 255 when `sqrt(dx^2 + dy^2) / 4 > 50`, else 0. All
//! results are computed into a scratch buffer before any sample is written,
//! so no pixel sees an already-updated neighbour. Border pixels keep their
//! values.

use tracing::trace;

use crate::{check_frame, OpsResult};

/// Magnitude above which a pixel is marked as an edge.
pub const EDGE_THRESHOLD: f64 = 50.0;
/// Value written for edge pixels.
pub const EDGE_ON: i32 = 255;
/// Value written for non-edge pixels.
pub const EDGE_OFF: i32 = 0;

/// Gradient magnitude `sqrt(dx^2 + dy^2) / 4`.
///
/// Squares are taken in `f64`, so any gradient built from `i32` samples is
/// accepted.
#[inline]
pub fn magnitude(dx: i64, dy: i64) -> f64 {
    let (dx, dy) = (dx as f64, dy as f64);
    (dx * dx + dy * dy).sqrt() / 4.0
}

/// Runs Sobel on one frame in place.
///
/// Frames narrower or shorter than 3 have no interior and are left as is.
pub fn sobel(buf: &mut [i32], width: usize, height: usize) -> OpsResult<()> {
    check_frame(buf, width, height)?;
    trace!(width, height, "sobel");
    if width < 3 || height < 3 {
        return Ok(());
    }

    let mut scratch = vec![0i32; buf.len()];
    for j in 1..height - 1 {
        for k in 1..width - 1 {
            let px = |row: usize, col: usize| buf[row * width + col] as i64;
            let nw = px(j - 1, k - 1);
            let n = px(j - 1, k);
            let ne = px(j - 1, k + 1);
            let sw = px(j + 1, k - 1);
            let s = px(j + 1, k);
            let se = px(j + 1, k + 1);
            let w = px(j, k - 1);
            let e = px(j, k + 1);

            let dx = -nw + ne - 2 * w + 2 * e - sw + se;
            let dy = se + 2 * s + sw - ne - 2 * n - nw;

            scratch[j * width + k] = if magnitude(dx, dy) > EDGE_THRESHOLD { EDGE_ON } else { EDGE_OFF };
        }
    }

    for j in 1..height - 1 {
        let row = j * width + 1..j * width + width - 1;
        buf[row.clone()].copy_from_slice(&scratch[row]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_interior_zero() {
        let mut buf = vec![100; 64];
        sobel(&mut buf, 8, 8).unwrap();
        for j in 0..8 {
            for k in 0..8 {
                let border = j == 0 || k == 0 || j == 7 || k == 7;
                assert_eq!(buf[j * 8 + k], if border { 100 } else { 0 }, "at ({}, {})", j, k);
            }
        }
    }

    #[test]
    fn test_vertical_step_edge() {
        // Left three columns black, right three white.
        let mut buf: Vec<i32> = (0..36).map(|i| if i % 6 < 3 { 0 } else { 255 }).collect();
        sobel(&mut buf, 6, 6).unwrap();
        for j in 1..5 {
            assert_eq!(buf[j * 6 + 1], 0);
            assert_eq!(buf[j * 6 + 2], 255);
            assert_eq!(buf[j * 6 + 3], 255);
            assert_eq!(buf[j * 6 + 4], 0);
        }
        // Borders kept.
        assert_eq!(buf[0], 0);
        assert_eq!(buf[5], 255);
    }

    #[test]
    fn test_threshold_is_strict() {
        // Only E set: dx = 2E, dy = 0, magnitude = E / 2.
        let mut buf = vec![0, 0, 0, 0, 0, 100, 0, 0, 0];
        sobel(&mut buf, 3, 3).unwrap();
        assert_eq!(buf[4], 0);

        let mut buf = vec![0, 0, 0, 0, 0, 101, 0, 0, 0];
        sobel(&mut buf, 3, 3).unwrap();
        assert_eq!(buf[4], 255);
        assert_eq!(buf[5], 101);
    }

    #[test]
    fn test_reads_only_original_values() {
        // A single bright pixel: every neighbour sees it, even after the
        // centre itself has been classified.
        let mut buf = vec![0; 25];
        buf[12] = 255;
        sobel(&mut buf, 5, 5).unwrap();
        assert_eq!(buf[12], 0);
        for idx in [6, 7, 8, 11, 13, 16, 17, 18] {
            assert_eq!(buf[idx], 255, "neighbour {}", idx);
        }
    }

    #[test]
    fn test_tiny_frame_untouched() {
        let mut buf = vec![5, 9];
        sobel(&mut buf, 2, 1).unwrap();
        assert_eq!(buf, vec![5, 9]);
    }

    #[test]
    fn test_extreme_samples() {
        let (lo, hi) = (i32::MIN, i32::MAX);
        let mut buf = vec![lo, 0, hi, lo, 0, hi, lo, 0, hi];
        sobel(&mut buf, 3, 3).unwrap();
        assert_eq!(buf[4], EDGE_ON);
        assert_eq!(buf[3], lo);

        let dx = 8 * i32::MAX as i64;
        assert!(magnitude(dx, -dx).is_finite());
        assert!(magnitude(dx, -dx) > EDGE_THRESHOLD);
    }

    #[test]
    fn test_magnitude() {
        assert_eq!(magnitude(0, 0), 0.0);
        assert_eq!(magnitude(120, 160), 50.0);
    }
}
