//! Work partitioning and distributed execution of the gifpar filter pipeline.
//!
//! # Architecture
//!
//! ```text
//! Scheduler (ExecutionFlags)
//!     └── DistributionEngine
//!             ├── WorkAssignment / OffsetTable   (slice boundaries)
//!             ├── Transport                      (LocalTransport, ThreadTransport)
//!             └── FramePipeline
//!                     └── FilterBackend          (CpuBackend, AcceleratorBackend)
//! ```
//!
//! The coordinator (rank 0) owns the whole [`FlattenedBuffer`]. Every worker
//! rank receives one contiguous slice covering whole frames, runs blur then
//! Sobel on each frame, and hands back a slice of exactly the same length.
//!
//! # Example
//!
//! ```rust
//! use gifpar_core::{Frame, FlattenedBuffer, FrameSequence};
//! use gifpar_compute::{
//!     DistributionEngine, ExecutionFlags, FramePipeline, LocalTransport,
//! };
//!
//! let frames = (0..6).map(|_| Frame::filled(16, 16, 80).unwrap()).collect();
//! let seq = FrameSequence::new(frames).unwrap();
//! let mut buffer = FlattenedBuffer::from_sequence(&seq).unwrap();
//!
//! let pipeline = FramePipeline::cpu(Default::default());
//! let engine = DistributionEngine::new(pipeline.clone());
//! let mut transport = LocalTransport::new(3, pipeline);
//! let flags = ExecutionFlags { distributed: true, ..Default::default() };
//!
//! let summary = engine.run(&mut buffer, flags, &mut transport).unwrap();
//! assert_eq!(summary.exchanges, 2);
//! ```
//!
//! [`FlattenedBuffer`]: gifpar_core::FlattenedBuffer

pub mod backend;
pub mod engine;
pub mod partition;
pub mod pipeline;
pub mod scheduler;
pub mod spatial;
pub mod transport;

pub use backend::{
    Accelerator, AcceleratorBackend, Backend, BackendInfo, CpuBackend, FilterBackend, NoAccelerator,
    describe_backends, detect_backends, select_backend,
};
pub use engine::{DistributionEngine, EngineConfig, RunSummary};
pub use partition::{WorkAssignment, WorkUnit, first_image_of_rank, images_for_rank};
pub use pipeline::FramePipeline;
pub use scheduler::{Capabilities, ExecutionFlags, ExecutionStrategy, MIN_FRAMES_FOR_PARALLELISM, Scheduler};
pub use spatial::{HaloSides, PatchLayout, PatchRect, SpatialPatch, sobel_by_patches};
pub use transport::{LocalTransport, SliceDescriptor, SliceMessage, ThreadTransport, Transport};

use gifpar_ops::OpsError;
use thiserror::Error;

/// Partitioning and execution errors.
#[derive(Error, Debug)]
pub enum ComputeError {
    #[error("Invalid partition: {0}")]
    InvalidPartition(String),

    #[error("Exchange size mismatch with rank {rank}: sent {expected} samples, got {actual}")]
    ExchangeSizeMismatch { rank: usize, expected: usize, actual: usize },

    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("Worker {0} disconnected")]
    WorkerDisconnected(usize),

    #[error("Worker {0} panicked")]
    WorkerPanicked(usize),

    #[error(transparent)]
    Ops(#[from] OpsError),

    #[error(transparent)]
    Core(#[from] gifpar_core::Error),
}

pub type ComputeResult<T> = Result<T, ComputeError>;
