//! Accelerator device interface.
//!
//! The device itself is an external collaborator: it reports whether it is
//! present and runs the blur and Sobel kernels in place. Results follow the
//! CPU kernels' contract but need not match them bit for bit.

use std::sync::Arc;

use gifpar_ops::BlurParams;
use tracing::trace;

use super::FilterBackend;
use crate::{ComputeError, ComputeResult};

/// An accelerator device.
pub trait Accelerator: Send + Sync {
    /// Device name.
    fn name(&self) -> &'static str;

    /// Whether the device can take work.
    fn is_available(&self) -> bool;

    /// Convergent box blur on one frame.
    fn blur(&self, frame: &mut [i32], radius: usize, threshold: i32, width: usize, height: usize) -> ComputeResult<()>;

    /// Sobel on one frame.
    fn sobel(&self, frame: &mut [i32], width: usize, height: usize) -> ComputeResult<()>;
}

/// Stand-in used when no device is installed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAccelerator;

impl Accelerator for NoAccelerator {
    fn name(&self) -> &'static str {
        "none"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn blur(&self, _frame: &mut [i32], _radius: usize, _threshold: i32, _width: usize, _height: usize) -> ComputeResult<()> {
        Err(ComputeError::BackendNotAvailable("no accelerator installed".into()))
    }

    fn sobel(&self, _frame: &mut [i32], _width: usize, _height: usize) -> ComputeResult<()> {
        Err(ComputeError::BackendNotAvailable("no accelerator installed".into()))
    }
}

/// [`FilterBackend`] that forwards every frame to a device.
#[derive(Clone)]
pub struct AcceleratorBackend {
    device: Arc<dyn Accelerator>,
}

impl AcceleratorBackend {
    /// Wraps a device, failing if it is not available.
    pub fn new(device: Arc<dyn Accelerator>) -> ComputeResult<Self> {
        if !device.is_available() {
            return Err(ComputeError::BackendNotAvailable(format!(
                "accelerator '{}' is not available",
                device.name()
            )));
        }
        Ok(Self { device })
    }

    /// Wraps a device whose availability was already established by a
    /// [`Capabilities`](crate::Capabilities) snapshot. The device is not
    /// queried again.
    pub fn detected(device: Arc<dyn Accelerator>) -> Self {
        Self { device }
    }

    /// Device name.
    pub fn device_name(&self) -> &'static str {
        self.device.name()
    }
}

impl std::fmt::Debug for AcceleratorBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcceleratorBackend").field("device", &self.device.name()).finish()
    }
}

impl FilterBackend for AcceleratorBackend {
    fn name(&self) -> &'static str {
        "accelerator"
    }

    fn blur(&self, frame: &mut [i32], width: usize, height: usize, params: &BlurParams) -> ComputeResult<()> {
        trace!(device = self.device.name(), width, height, "accelerator::blur");
        self.device.blur(frame, params.radius, params.threshold, width, height)
    }

    fn sobel(&self, frame: &mut [i32], width: usize, height: usize) -> ComputeResult<()> {
        trace!(device = self.device.name(), width, height, "accelerator::sobel");
        self.device.sobel(frame, width, height)
    }
}
