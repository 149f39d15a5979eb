//! Per-slice filter pipeline.
//!
//! A slice is a run of whole frames. Every frame gets blur and then Sobel,
//! touching only its own sample range. With `threaded` set the frames are
//! processed in parallel on the rayon pool; the per-frame `&mut` slices are
//! carved out with `split_at_mut`, so they never alias.

use std::fmt;
use std::sync::Arc;

use gifpar_core::{FrameGeometry, OffsetTable};
use gifpar_ops::BlurParams;
use rayon::prelude::*;
use tracing::trace;

use crate::backend::{Accelerator, Backend, CpuBackend, FilterBackend, select_backend};
use crate::scheduler::{Capabilities, ExecutionFlags};
use crate::ComputeResult;

/// Blur-then-Sobel over every frame of a slice.
///
/// Cloning is cheap: the backend is shared.
#[derive(Clone)]
pub struct FramePipeline {
    backend: Arc<dyn FilterBackend>,
    blur: BlurParams,
    threaded: bool,
}

impl FramePipeline {
    /// Creates a pipeline over an explicit backend.
    pub fn new(backend: Arc<dyn FilterBackend>, blur: BlurParams, threaded: bool) -> Self {
        Self { backend, blur, threaded }
    }

    /// Sequential CPU pipeline.
    pub fn cpu(blur: BlurParams) -> Self {
        Self::new(Arc::new(CpuBackend::new()), blur, false)
    }

    /// Pipeline matching resolved execution flags and the run's
    /// capability snapshot.
    pub fn from_flags(
        flags: ExecutionFlags,
        device: Arc<dyn Accelerator>,
        caps: &Capabilities,
        blur: BlurParams,
    ) -> ComputeResult<Self> {
        let requested = if flags.accelerated { Backend::Accelerator } else { Backend::Cpu };
        let backend = select_backend(requested, device, caps)?;
        Ok(Self::new(backend, blur, flags.threaded))
    }

    /// Toggles frame parallelism.
    pub fn with_threaded(mut self, threaded: bool) -> Self {
        self.threaded = threaded;
        self
    }

    /// Backend name.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Blur parameters.
    pub fn blur_params(&self) -> &BlurParams {
        &self.blur
    }

    /// Whether frames run in parallel.
    pub fn is_threaded(&self) -> bool {
        self.threaded
    }

    /// Blur then Sobel on a single frame.
    pub fn process_frame(&self, frame: &mut [i32], geometry: FrameGeometry) -> ComputeResult<()> {
        let (width, height) = (geometry.width as usize, geometry.height as usize);
        trace!(width, height, backend = self.backend.name(), "pipeline::frame");
        self.backend.blur(frame, width, height, &self.blur)?;
        self.backend.sobel(frame, width, height)
    }

    /// Processes a slice holding the frames described by `geometry`.
    pub fn process_frames(&self, samples: &mut [i32], geometry: &[FrameGeometry]) -> ComputeResult<()> {
        let offsets = OffsetTable::from_geometry(geometry)?;
        if offsets.total() != samples.len() {
            return Err(gifpar_core::Error::BufferSizeMismatch {
                expected: offsets.total(),
                actual: samples.len(),
            }
            .into());
        }

        let mut frames: Vec<(FrameGeometry, &mut [i32])> = Vec::with_capacity(geometry.len());
        let mut rest = samples;
        for g in geometry {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(g.samples());
            frames.push((*g, head));
            rest = tail;
        }

        if self.threaded {
            frames.into_par_iter().try_for_each(|(g, frame)| self.process_frame(frame, g))
        } else {
            frames.into_iter().try_for_each(|(g, frame)| self.process_frame(frame, g))
        }
    }
}

impl fmt::Debug for FramePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FramePipeline")
            .field("backend", &self.backend.name())
            .field("blur", &self.blur)
            .field("threaded", &self.threaded)
            .finish()
    }
}
