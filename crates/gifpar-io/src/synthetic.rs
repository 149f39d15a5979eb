//! Seeded random frames for benchmark runs.

use gifpar_core::{Frame, FrameSequence, Rgb};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::IoResult;

/// Seed used when the caller does not pick one.
pub const DEFAULT_SEED: u64 = 1;

/// Generates `n_frames` frames of uniform random RGB noise.
///
/// The same seed always gives the same sequence.
pub fn generate(n_frames: usize, width: u32, height: u32, seed: u64) -> IoResult<FrameSequence> {
    let mut rng = StdRng::seed_from_u64(seed);
    let count = width as usize * height as usize;

    let mut frames = Vec::with_capacity(n_frames);
    for _ in 0..n_frames {
        let pixels = (0..count)
            .map(|_| Rgb::new(rng.gen_range(0..=255), rng.gen_range(0..=255), rng.gen_range(0..=255)))
            .collect();
        frames.push(Frame::new(width, height, pixels)?);
    }

    debug!(n_frames, width, height, seed, "generated synthetic frames");
    Ok(FrameSequence::new(frames)?)
}
