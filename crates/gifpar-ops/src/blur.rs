//! Iterative box blur with a convergence test.
//!
//! Each pass averages a `(2r+1) x (2r+1)` window around every eligible
//! pixel, reading only from the previous pass, then commits the whole
//! candidate. Passes repeat until no interior pixel moved by more than
//! `threshold`, or exactly once when `threshold <= 0`.
//!
//! # Region policy
//!
//! Only the top and bottom tenth of the frame is blurred; the middle rows
//! are carried over unchanged. Within those bands only columns in
//! `[r, width - r)` are touched, and the outermost ring of pixels is never
//! committed:
//!
//! ```text
//! rows [r, h/10 - r)              blurred
//! rows [h/10 - r, 0.9h + r)       copied
//! rows [trunc(0.9h + r), h - r)   blurred
//! ```
//!
//! Window means use truncating integer division.

use tracing::trace;

use crate::{check_frame, OpsError, OpsResult};

/// Default stencil radius.
pub const DEFAULT_RADIUS: usize = 5;
/// Default convergence threshold.
pub const DEFAULT_THRESHOLD: i32 = 20;

/// Blur parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlurParams {
    /// Stencil radius; the window is `2 * radius + 1` samples wide.
    pub radius: usize,
    /// Largest per-pixel change that still counts as converged.
    /// Zero or negative runs a single pass.
    pub threshold: i32,
}

impl Default for BlurParams {
    fn default() -> Self {
        Self { radius: DEFAULT_RADIUS, threshold: DEFAULT_THRESHOLD }
    }
}

impl BlurParams {
    /// Creates blur parameters.
    pub fn new(radius: usize, threshold: i32) -> Self {
        Self { radius, threshold }
    }
}

/// What the convergence loop did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlurOutcome {
    /// Number of passes executed (always at least 1).
    pub iterations: u32,
    /// Whether the last pass stayed within the threshold.
    pub converged: bool,
}

/// Rows that receive the stencil.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RowBands {
    top: std::ops::Range<usize>,
    bottom: std::ops::Range<usize>,
}

impl RowBands {
    fn new(height: usize, radius: usize) -> Self {
        let top = radius..(height / 10).saturating_sub(radius);
        let bottom_start = (height as f64 * 0.9 + radius as f64) as usize;
        let bottom = bottom_start..height.saturating_sub(radius);
        Self { top, bottom }
    }

    fn rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.top.clone().chain(self.bottom.clone())
    }
}

/// Blurs one frame in place until it converges.
///
/// `buf` must hold exactly `width * height` row-major samples.
pub fn blur(buf: &mut [i32], width: usize, height: usize, params: &BlurParams) -> OpsResult<BlurOutcome> {
    check_frame(buf, width, height)?;
    let radius = params.radius;
    let span = radius
        .checked_mul(2)
        .and_then(|v| v.checked_add(1))
        .ok_or_else(|| OpsError::InvalidParameter(format!("blur radius {} too large", radius)))?;
    let area = (span as i64) * (span as i64);

    let bands = RowBands::new(height, radius);
    let cols = radius..width.saturating_sub(radius);
    let mut next = vec![0i32; buf.len()];
    let mut iterations = 0u32;

    loop {
        iterations += 1;
        next.copy_from_slice(buf);

        for j in bands.rows() {
            for k in cols.clone() {
                let mut sum = 0i64;
                for sj in (j - radius)..=(j + radius) {
                    let row = &buf[sj * width + k - radius..=sj * width + k + radius];
                    sum += row.iter().map(|&v| v as i64).sum::<i64>();
                }
                next[j * width + k] = (sum / area) as i32;
            }
        }

        let converged = commit_interior(buf, &next, width, height, params.threshold);
        trace!(iterations, converged, "blur pass");

        if params.threshold <= 0 || converged {
            return Ok(BlurOutcome { iterations, converged });
        }
    }
}

/// Copies interior samples from `next` into `buf`, reporting whether every
/// change stayed within `threshold`.
fn commit_interior(buf: &mut [i32], next: &[i32], width: usize, height: usize, threshold: i32) -> bool {
    let mut converged = true;
    for j in 1..height.saturating_sub(1) {
        let start = j * width + 1;
        let end = j * width + width - 1;
        if start >= end {
            continue;
        }
        for (dst, &src) in buf[start..end].iter_mut().zip(&next[start..end]) {
            if (src as i64 - *dst as i64).abs() > threshold as i64 {
                converged = false;
            }
            *dst = src;
        }
    }
    converged
}
