//! Coordinator side of a run.
//!
//! The engine owns nothing but the pipeline. For each run it partitions the
//! buffer's frames, ships one slice per worker rank through a
//! [`Transport`], and copies every reply back over the range it came from.
//! The slice length is computed once from the offset table and checked
//! again on return; a reply of any other length aborts the run.

use std::sync::Arc;
use std::time::{Duration, Instant};

use gifpar_core::FlattenedBuffer;
use gifpar_ops::BlurParams;
use tracing::{debug, info};

use crate::backend::Accelerator;
use crate::partition::WorkAssignment;
use crate::pipeline::FramePipeline;
use crate::scheduler::{Capabilities, ExecutionFlags, ExecutionStrategy, Scheduler};
use crate::transport::{SliceDescriptor, SliceMessage, Transport};
use crate::{ComputeError, ComputeResult};

/// Kernel settings shared by every rank of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineConfig {
    /// Blur parameters used by every frame.
    pub blur: BlurParams,
}

impl EngineConfig {
    /// Builds the pipeline for resolved flags and the run's capability
    /// snapshot.
    pub fn pipeline(
        &self,
        flags: ExecutionFlags,
        device: Arc<dyn Accelerator>,
        caps: &Capabilities,
    ) -> ComputeResult<FramePipeline> {
        FramePipeline::from_flags(flags, device, caps, self.blur)
    }
}

/// What a run did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// How the frames were processed.
    pub strategy: ExecutionStrategy,
    /// Slices exchanged with workers (0 for a local run).
    pub exchanges: usize,
    /// Frames processed.
    pub frames: usize,
    /// Wall time of the run.
    pub elapsed: Duration,
}

impl RunSummary {
    /// Elapsed time in seconds.
    pub fn seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// Coordinator.
#[derive(Debug, Clone)]
pub struct DistributionEngine {
    pipeline: FramePipeline,
}

impl DistributionEngine {
    /// Engine that runs `pipeline` for local work.
    pub fn new(pipeline: FramePipeline) -> Self {
        Self { pipeline }
    }

    /// Pipeline used when the run stays on the coordinator.
    pub fn pipeline(&self) -> &FramePipeline {
        &self.pipeline
    }

    /// Filters every frame of `buffer` in place.
    pub fn run(
        &self,
        buffer: &mut FlattenedBuffer,
        flags: ExecutionFlags,
        transport: &mut dyn Transport,
    ) -> ComputeResult<RunSummary> {
        let start = Instant::now();
        let world_size = transport.world_size();
        let frames = buffer.frame_count();
        let assignment = WorkAssignment::new(frames, world_size)?;
        let strategy = ExecutionStrategy::from_flags(flags, world_size);

        info!(%strategy, frames, world_size, flags = %flags.describe(), "run");

        let mut exchanges = 0;
        if !Scheduler::should_distribute(flags, world_size) || assignment.is_local() {
            let geometry = buffer.geometry().to_vec();
            self.pipeline.process_frames(buffer.samples_mut(), &geometry)?;
        } else {
            for unit in assignment.units() {
                // Zero-count ranks are trailing, nothing after them has work.
                if unit.is_empty() {
                    debug!(rank = unit.rank, "no frames from here on");
                    break;
                }

                let descriptor = SliceDescriptor::for_frames(buffer.offsets(), unit.first, unit.count)?;
                let msg = SliceMessage {
                    rank: unit.rank,
                    first: unit.first,
                    count: unit.count,
                    descriptor,
                    geometry: buffer.geometry()[unit.frames()].to_vec(),
                    samples: buffer.samples()[descriptor.range()].to_vec(),
                };
                debug!(
                    rank = unit.rank,
                    first = unit.first,
                    count = unit.count,
                    len = descriptor.len,
                    "exchange"
                );

                let reply = transport.exchange(msg)?;
                if reply.samples.len() != descriptor.len {
                    return Err(ComputeError::ExchangeSizeMismatch {
                        rank: unit.rank,
                        expected: descriptor.len,
                        actual: reply.samples.len(),
                    });
                }
                buffer.slice_mut(descriptor.range())?.copy_from_slice(&reply.samples);
                exchanges += 1;
            }
        }

        let summary = RunSummary { strategy, exchanges, frames, elapsed: start.elapsed() };
        info!(exchanges, seconds = summary.seconds(), "run finished");
        Ok(summary)
    }
}
