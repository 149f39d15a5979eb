//! Slice exchange between the coordinator and worker ranks.
//!
//! An exchange is one blocking send followed by one blocking receive. The
//! coordinator builds a [`SliceMessage`] whose [`SliceDescriptor`] records
//! where the samples came from; the worker returns a message with the same
//! descriptor and exactly as many samples as it was sent.
//!
//! Two transports are provided:
//!
//! - [`LocalTransport`] runs the worker side synchronously on the calling
//!   thread. It is what a world of one process uses and what tests use to
//!   check the exchange logic without threads.
//! - [`ThreadTransport`] runs one named thread per worker rank and talks to
//!   it over `mpsc` channels. Payloads are owned `Vec<i32>` moved through
//!   the channel; nothing is shared.

use std::ops::Range;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use gifpar_core::{FrameGeometry, OffsetTable};
use tracing::{debug, trace, warn};

use crate::partition::{first_image_of_rank, images_for_rank};
use crate::pipeline::FramePipeline;
use crate::{ComputeError, ComputeResult};

/// Location of a slice inside the coordinator's flattened buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceDescriptor {
    /// First sample.
    pub offset: usize,
    /// Number of samples, used for both directions of the exchange.
    pub len: usize,
}

impl SliceDescriptor {
    /// Descriptor for frames `[first, first + count)`.
    pub fn for_frames(offsets: &OffsetTable, first: usize, count: usize) -> ComputeResult<Self> {
        let range = offsets.slice_range(first, count)?;
        Ok(Self { offset: range.start, len: range.len() })
    }

    /// Sample range in the flattened buffer.
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.len
    }
}

/// One slice in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceMessage {
    /// Worker rank the slice belongs to.
    pub rank: usize,
    /// First frame index.
    pub first: usize,
    /// Number of frames.
    pub count: usize,
    /// Where the samples live on the coordinator.
    pub descriptor: SliceDescriptor,
    /// Geometry of the `count` frames.
    pub geometry: Vec<FrameGeometry>,
    /// Samples, `descriptor.len` of them.
    pub samples: Vec<i32>,
}

/// Moves slices to workers and back.
pub trait Transport {
    /// Total ranks, coordinator included.
    fn world_size(&self) -> usize;

    /// Sends `msg` to `msg.rank` and waits for the processed slice.
    fn exchange(&mut self, msg: SliceMessage) -> ComputeResult<SliceMessage>;
}

/// Worker side of an exchange: run the pipeline over the slice.
fn process_slice(mut msg: SliceMessage, pipeline: &FramePipeline) -> ComputeResult<SliceMessage> {
    if msg.samples.len() != msg.descriptor.len {
        return Err(ComputeError::ExchangeSizeMismatch {
            rank: msg.rank,
            expected: msg.descriptor.len,
            actual: msg.samples.len(),
        });
    }
    if msg.geometry.len() != msg.count {
        return Err(ComputeError::InvalidPartition(format!(
            "slice for rank {} declares {} frames but carries {} geometries",
            msg.rank,
            msg.count,
            msg.geometry.len()
        )));
    }
    trace!(rank = msg.rank, first = msg.first, count = msg.count, "worker::process");
    pipeline.process_frames(&mut msg.samples, &msg.geometry)?;
    Ok(msg)
}

// ============================================================================
// Local
// ============================================================================

/// Single-process transport: every "worker" runs inline.
#[derive(Debug, Clone)]
pub struct LocalTransport {
    world_size: usize,
    pipeline: FramePipeline,
}

impl LocalTransport {
    /// Simulates a world of `world_size` ranks.
    pub fn new(world_size: usize, pipeline: FramePipeline) -> Self {
        Self { world_size, pipeline }
    }
}

impl Transport for LocalTransport {
    fn world_size(&self) -> usize {
        self.world_size
    }

    fn exchange(&mut self, msg: SliceMessage) -> ComputeResult<SliceMessage> {
        if msg.rank == 0 || msg.rank >= self.world_size {
            return Err(ComputeError::WorkerDisconnected(msg.rank));
        }
        process_slice(msg, &self.pipeline)
    }
}

// ============================================================================
// Threads
// ============================================================================

struct WorkerLink {
    to_worker: Sender<SliceMessage>,
    from_worker: Receiver<ComputeResult<SliceMessage>>,
}

/// One thread per worker rank, connected by channels.
pub struct ThreadTransport {
    world_size: usize,
    links: Vec<WorkerLink>,
    handles: Vec<(usize, JoinHandle<()>)>,
}

impl ThreadTransport {
    /// Spawns `world_size - 1` workers.
    ///
    /// Every worker gets the geometry of the whole sequence and derives its
    /// own frame range from it. A worker with nothing to do exits at once.
    pub fn spawn(world_size: usize, geometry: Arc<[FrameGeometry]>, pipeline: FramePipeline) -> ComputeResult<Self> {
        if world_size < 1 {
            return Err(ComputeError::InvalidPartition(format!(
                "world size must be at least 1, got {}",
                world_size
            )));
        }

        let mut links = Vec::with_capacity(world_size - 1);
        let mut handles = Vec::with_capacity(world_size - 1);

        for rank in 1..world_size {
            let (to_worker, worker_rx) = mpsc::channel();
            let (worker_tx, from_worker) = mpsc::channel();
            let geometry = Arc::clone(&geometry);
            let pipeline = pipeline.clone();

            let handle = thread::Builder::new()
                .name(format!("gifpar-worker-{}", rank))
                .spawn(move || worker_main(rank, world_size, &geometry, &pipeline, worker_rx, worker_tx))
                .map_err(|e| {
                    warn!(rank, error = %e, "failed to spawn worker");
                    ComputeError::WorkerDisconnected(rank)
                })?;

            links.push(WorkerLink { to_worker, from_worker });
            handles.push((rank, handle));
        }

        debug!(world_size, "thread transport up");
        Ok(Self { world_size, links, handles })
    }

    /// Closes every channel and joins the workers.
    pub fn shutdown(mut self) -> ComputeResult<()> {
        self.links.clear();
        let mut result = Ok(());
        for (rank, handle) in self.handles.drain(..) {
            if handle.join().is_err() && result.is_ok() {
                result = Err(ComputeError::WorkerPanicked(rank));
            }
        }
        result
    }
}

impl Transport for ThreadTransport {
    fn world_size(&self) -> usize {
        self.world_size
    }

    fn exchange(&mut self, msg: SliceMessage) -> ComputeResult<SliceMessage> {
        let rank = msg.rank;
        let link = rank
            .checked_sub(1)
            .and_then(|i| self.links.get(i))
            .ok_or(ComputeError::WorkerDisconnected(rank))?;

        link.to_worker.send(msg).map_err(|_| ComputeError::WorkerDisconnected(rank))?;
        link.from_worker.recv().map_err(|_| ComputeError::WorkerDisconnected(rank))?
    }
}

fn worker_main(
    rank: usize,
    world_size: usize,
    geometry: &[FrameGeometry],
    pipeline: &FramePipeline,
    inbox: Receiver<SliceMessage>,
    outbox: Sender<ComputeResult<SliceMessage>>,
) {
    let n_frames = geometry.len();
    let count = images_for_rank(rank, n_frames, world_size);
    let Some(first) = first_image_of_rank(rank, n_frames, world_size) else { return };
    if count == 0 {
        debug!(rank, "no frames assigned, worker exiting");
        return;
    }

    let expected = match OffsetTable::from_geometry(geometry).and_then(|o| o.slice_range(first, count)) {
        Ok(range) => range.len(),
        Err(e) => {
            let _ = outbox.send(Err(e.into()));
            return;
        }
    };

    // Coordinator hung up before sending: nothing to do.
    let Ok(msg) = inbox.recv() else { return };

    let result = if msg.samples.len() != expected || msg.first != first || msg.count != count {
        Err(ComputeError::ExchangeSizeMismatch { rank, expected, actual: msg.samples.len() })
    } else {
        process_slice(msg, pipeline)
    };
    let _ = outbox.send(result);
}
