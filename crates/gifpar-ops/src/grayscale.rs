//! Grayscale reduction.
//!
//! Luminance is the truncated mean of R, G and B clamped to `[0, 255]`
//! ([`Rgb::luma`]). The same rule is used when flattening a sequence, so
//! applying [`apply_gray_filter`] first and flattening afterwards gives the
//! same samples as flattening directly.

use gifpar_core::{FrameSequence, Rgb};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::trace;

/// Reduces one frame's pixels to luminance samples.
pub fn to_luma(pixels: &[Rgb]) -> Vec<i32> {
    pixels.iter().map(Rgb::luma).collect()
}

/// Replaces every pixel of every frame with its gray equivalent.
pub fn apply_gray_filter(sequence: &mut FrameSequence) {
    trace!(frames = sequence.len(), "grayscale::apply_gray_filter");

    #[cfg(feature = "parallel")]
    sequence.frames_mut().par_iter_mut().for_each(|frame| gray_in_place(&mut frame.pixels));

    #[cfg(not(feature = "parallel"))]
    sequence.frames_mut().iter_mut().for_each(|frame| gray_in_place(&mut frame.pixels));
}

fn gray_in_place(pixels: &mut [Rgb]) {
    for px in pixels {
        *px = Rgb::gray(px.luma());
    }
}
