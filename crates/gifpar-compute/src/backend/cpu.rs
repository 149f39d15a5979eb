//! CPU backend on top of `gifpar-ops`.

use gifpar_ops::{BlurParams, blur, sobel};
use tracing::trace;

use super::FilterBackend;
use crate::ComputeResult;

/// Runs the kernels on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuBackend;

impl CpuBackend {
    pub fn new() -> Self {
        Self
    }
}

impl FilterBackend for CpuBackend {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn blur(&self, frame: &mut [i32], width: usize, height: usize, params: &BlurParams) -> ComputeResult<()> {
        let outcome = blur::blur(frame, width, height, params)?;
        trace!(iterations = outcome.iterations, converged = outcome.converged, "cpu::blur");
        Ok(())
    }

    fn sobel(&self, frame: &mut [i32], width: usize, height: usize) -> ComputeResult<()> {
        sobel::sobel(frame, width, height)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_ops() {
        let mut a: Vec<i32> = (0..400).map(|i| (i * 13 % 256) as i32).collect();
        let mut b = a.clone();
        let params = BlurParams::new(1, 10);

        let backend = CpuBackend::new();
        backend.blur(&mut a, 20, 20, &params).unwrap();
        backend.sobel(&mut a, 20, 20).unwrap();

        blur::blur(&mut b, 20, 20, &params).unwrap();
        sobel::sobel(&mut b, 20, 20).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_propagates_ops_error() {
        let mut buf = vec![0; 3];
        let err = CpuBackend::new().sobel(&mut buf, 2, 2).unwrap_err();
        assert!(matches!(err, crate::ComputeError::Ops(_)));
    }
}
