//! Kernel backends.
//!
//! A [`FilterBackend`] runs the two per-frame kernels. The CPU backend calls
//! straight into `gifpar-ops`; the accelerator backend forwards to an
//! [`Accelerator`] device, one frame at a time.
//!
//! ```text
//! FramePipeline
//!     └── Arc<dyn FilterBackend>
//!             ├── CpuBackend          (gifpar-ops)
//!             └── AcceleratorBackend  (Arc<dyn Accelerator>)
//! ```

mod accelerator;
mod cpu;
mod detect;

pub use accelerator::{Accelerator, AcceleratorBackend, NoAccelerator};
pub use cpu::CpuBackend;
pub use detect::{BackendInfo, describe_backends, detect_backends, select_backend};

use gifpar_ops::BlurParams;

use crate::ComputeResult;

/// Available kernel backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// Accelerator when one answers, CPU otherwise.
    #[default]
    Auto,
    /// CPU kernels.
    Cpu,
    /// Accelerator device kernels.
    Accelerator,
}

impl Backend {
    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Cpu => "cpu",
            Self::Accelerator => "accelerator",
        }
    }
}

/// Per-frame kernels.
///
/// Both calls work in place on one frame's row-major samples.
pub trait FilterBackend: Send + Sync {
    /// Backend name.
    fn name(&self) -> &'static str;

    /// Convergent box blur.
    fn blur(&self, frame: &mut [i32], width: usize, height: usize, params: &BlurParams) -> ComputeResult<()>;

    /// Thresholded Sobel.
    fn sobel(&self, frame: &mut [i32], width: usize, height: usize) -> ComputeResult<()>;
}
