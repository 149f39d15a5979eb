//! Frame-range partitioning across worker ranks.
//!
//! Rank 0 is the coordinator and never receives frames. Ranks `1..N` split
//! `[0, n_frames)` into contiguous ranges; the first `n_frames % (N - 1)`
//! ranks take one extra frame:
//!
//! ```text
//! n_frames = 7, N = 4 (3 workers)
//!
//! rank 1: [0, 3)   base 2 + 1
//! rank 2: [3, 5)   base 2
//! rank 3: [5, 7)   base 2
//! ```

use std::ops::Range;

use crate::{ComputeError, ComputeResult};

/// Number of frames rank `rank` processes.
///
/// Returns 0 for the coordinator, for ranks outside the world and when there
/// are no workers at all.
pub fn images_for_rank(rank: usize, n_frames: usize, world_size: usize) -> usize {
    let workers = world_size.saturating_sub(1);
    if workers == 0 || rank == 0 || rank > workers {
        return 0;
    }
    let remainder = n_frames % workers;
    n_frames / workers + usize::from(remainder >= rank)
}

/// Index of the first frame rank `rank` processes.
///
/// `None` for the coordinator and for ranks outside the world.
pub fn first_image_of_rank(rank: usize, n_frames: usize, world_size: usize) -> Option<usize> {
    let workers = world_size.saturating_sub(1);
    if rank == 0 || rank > workers {
        return None;
    }
    Some((1..rank).map(|r| images_for_rank(r, n_frames, world_size)).sum())
}

/// Frames assigned to one worker rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkUnit {
    /// Worker rank (1-based).
    pub rank: usize,
    /// First frame index.
    pub first: usize,
    /// Number of frames; 0 means the worker sits this run out.
    pub count: usize,
}

impl WorkUnit {
    /// Half-open frame range.
    #[inline]
    pub fn frames(&self) -> Range<usize> {
        self.first..self.first + self.count
    }

    /// Whether the unit carries any frames.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Partition of a frame sequence over every worker rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkAssignment {
    n_frames: usize,
    world_size: usize,
    units: Vec<WorkUnit>,
}

impl WorkAssignment {
    /// Partitions `n_frames` frames over a world of `world_size` ranks.
    ///
    /// A world of one rank has no workers: the assignment is empty and the
    /// coordinator processes everything itself.
    pub fn new(n_frames: usize, world_size: usize) -> ComputeResult<Self> {
        if world_size < 1 {
            return Err(ComputeError::InvalidPartition(format!(
                "world size must be at least 1, got {}",
                world_size
            )));
        }
        if n_frames == 0 {
            return Err(ComputeError::InvalidPartition("no frames to partition".into()));
        }

        let mut units = Vec::with_capacity(world_size - 1);
        let mut first = 0;
        for rank in 1..world_size {
            let count = images_for_rank(rank, n_frames, world_size);
            units.push(WorkUnit { rank, first, count });
            first += count;
        }
        debug_assert!(units.is_empty() || first == n_frames);

        Ok(Self { n_frames, world_size, units })
    }

    /// Total frames partitioned.
    pub fn n_frames(&self) -> usize {
        self.n_frames
    }

    /// World size, coordinator included.
    pub fn world_size(&self) -> usize {
        self.world_size
    }

    /// Number of worker ranks (`world_size - 1`).
    pub fn worker_count(&self) -> usize {
        self.units.len()
    }

    /// True when there are no workers and everything runs locally.
    pub fn is_local(&self) -> bool {
        self.units.is_empty()
    }

    /// Every worker's unit in rank order, zero-count ranks included.
    pub fn units(&self) -> &[WorkUnit] {
        &self.units
    }

    /// Unit of one worker rank.
    pub fn unit(&self, rank: usize) -> Option<&WorkUnit> {
        rank.checked_sub(1).and_then(|i| self.units.get(i))
    }

    /// Units that carry at least one frame.
    pub fn active_units(&self) -> impl Iterator<Item = &WorkUnit> {
        self.units.iter().filter(|u| !u.is_empty())
    }
}
