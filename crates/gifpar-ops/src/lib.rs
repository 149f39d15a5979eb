//! # gifpar-ops
//!
//! Filter kernels operating on one frame of a flattened luminance buffer.
//!
//! # Modules
//!
//! - [`grayscale`] - RGB to luminance reduction
//! - [`blur`] - iterative box blur that runs until it converges
//! - [`sobel`] - thresholded Sobel edge detection
//!
//! Every kernel takes a row-major `&mut [i32]` holding exactly
//! `width * height` samples and works in place.
//!
//! # Example
//!
//! ```rust
//! use gifpar_ops::blur::{blur, BlurParams};
//! use gifpar_ops::sobel::sobel;
//!
//! let mut frame = vec![100i32; 32 * 32];
//! let outcome = blur(&mut frame, 32, 32, &BlurParams::default()).unwrap();
//! assert!(outcome.converged);
//! sobel(&mut frame, 32, 32).unwrap();
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod blur;
pub mod grayscale;
pub mod sobel;

pub use blur::{BlurOutcome, BlurParams};
pub use error::{OpsError, OpsResult};

/// Checks that `buf` holds exactly `width * height` samples.
pub(crate) fn check_frame(buf: &[i32], width: usize, height: usize) -> OpsResult<()> {
    if width == 0 || height == 0 {
        return Err(OpsError::InvalidDimensions(format!(
            "frame must be non-empty, got {}x{}",
            width, height
        )));
    }
    let expected = width.checked_mul(height).ok_or_else(|| {
        OpsError::InvalidDimensions("frame dimensions overflow".into())
    })?;
    if buf.len() != expected {
        return Err(OpsError::InvalidDimensions(format!(
            "expected {} samples for {}x{}, got {}",
            expected,
            width,
            height,
            buf.len()
        )));
    }
    Ok(())
}
