//! Execution strategy selection.
//!
//! The scheduler is a pure function of the requested flags, the frame
//! count and a one-time snapshot of the accelerator:
//!
//! | frames | accelerator | result                         |
//! |--------|-------------|--------------------------------|
//! | < 5    | any         | everything off                 |
//! | >= 5   | available   | threaded + accelerated         |
//! | >= 5   | missing     | threaded                       |
//!
//! Benchmark mode bypasses the table and keeps the caller's flags.
//! Whether work actually leaves the coordinator is decided separately by
//! [`Scheduler::should_distribute`].

use std::fmt;

use tracing::debug;

use crate::backend::Accelerator;

/// Below this many frames, parallel execution is not worth its setup.
pub const MIN_FRAMES_FOR_PARALLELISM: usize = 5;

/// Which parallelism axes are enabled for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecutionFlags {
    /// Ship slices to worker ranks.
    pub distributed: bool,
    /// Process the frames of a slice in parallel.
    pub threaded: bool,
    /// Run kernels on the accelerator instead of the CPU.
    pub accelerated: bool,
}

impl ExecutionFlags {
    /// All axes off: one thread, one process, CPU kernels.
    pub const SEQUENTIAL: Self = Self { distributed: false, threaded: false, accelerated: false };

    /// One-line summary for logs.
    pub fn describe(&self) -> String {
        format!(
            "distributed={} threaded={} accelerated={}",
            self.distributed, self.threaded, self.accelerated
        )
    }
}

/// Snapshot of what the machine offers, taken once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// Whether an accelerator device answered.
    pub accelerator: bool,
}

impl Capabilities {
    /// Queries the accelerator once.
    pub fn detect(device: &dyn Accelerator) -> Self {
        let accelerator = device.is_available();
        debug!(device = device.name(), accelerator, "capabilities");
        Self { accelerator }
    }
}

/// Picks execution flags for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Scheduler {
    /// Keep the caller's flags untouched.
    pub benchmark: bool,
}

impl Scheduler {
    /// Auto-selecting scheduler.
    pub fn auto() -> Self {
        Self { benchmark: false }
    }

    /// Scheduler that passes the caller's flags through.
    pub fn benchmark() -> Self {
        Self { benchmark: true }
    }

    /// Resolves the flags for `n_frames` frames.
    ///
    /// `requested.distributed` survives auto-selection unless the frame
    /// count is below [`MIN_FRAMES_FOR_PARALLELISM`].
    pub fn resolve(&self, requested: ExecutionFlags, n_frames: usize, caps: &Capabilities) -> ExecutionFlags {
        if self.benchmark {
            return requested;
        }
        if n_frames < MIN_FRAMES_FOR_PARALLELISM {
            debug!(n_frames, "too few frames, running sequentially");
            return ExecutionFlags::SEQUENTIAL;
        }
        ExecutionFlags {
            distributed: requested.distributed,
            threaded: true,
            accelerated: caps.accelerator,
        }
    }

    /// Whether slices are shipped to workers. A world of one rank always
    /// runs locally.
    pub fn should_distribute(flags: ExecutionFlags, world_size: usize) -> bool {
        flags.distributed && world_size > 1
    }
}

/// How a run was executed, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// One thread on the coordinator.
    Sequential,
    /// Frame-parallel on the coordinator.
    Threaded,
    /// Accelerator kernels on the coordinator.
    Accelerated,
    /// Slices shipped to worker ranks.
    Distributed {
        /// Number of worker ranks.
        workers: usize,
        /// Workers process their frames in parallel.
        threaded: bool,
        /// Workers use the accelerator.
        accelerated: bool,
    },
}

impl ExecutionStrategy {
    /// Derives the strategy from resolved flags and the world size.
    pub fn from_flags(flags: ExecutionFlags, world_size: usize) -> Self {
        if Scheduler::should_distribute(flags, world_size) {
            Self::Distributed {
                workers: world_size - 1,
                threaded: flags.threaded,
                accelerated: flags.accelerated,
            }
        } else if flags.accelerated {
            Self::Accelerated
        } else if flags.threaded {
            Self::Threaded
        } else {
            Self::Sequential
        }
    }
}

impl fmt::Display for ExecutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Threaded => write!(f, "threaded"),
            Self::Accelerated => write!(f, "accelerated"),
            Self::Distributed { workers, threaded, accelerated } => {
                write!(f, "distributed over {} workers", workers)?;
                if *threaded {
                    write!(f, " +threads")?;
                }
                if *accelerated {
                    write!(f, " +accelerator")?;
                }
                Ok(())
            }
        }
    }
}
