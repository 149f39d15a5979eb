//! Run records.
//!
//! Every run appends one CSV line to a log file named after the mode and
//! the execution flags:
//!
//! ```text
//! results/runs_1_1_0.log             generated frames
//! results/runs_with_image_0_1_0.log  frames loaded from a file
//!
//! tag, world_size, n_frames, width, height, distributed, threaded, accelerated, seconds
//! bench-1, 4, 64, 640, 480, 1, 1, 0, 2.413205
//! ```
//!
//! Width and height are those of the first frame.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::IoResult;

/// One line of a run log.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    /// Free-form label for the run (iteration number, experiment name).
    pub tag: String,
    /// Ranks in the world, coordinator included.
    pub world_size: usize,
    /// Frames processed.
    pub n_frames: usize,
    /// Width of the first frame.
    pub width: u32,
    /// Height of the first frame.
    pub height: u32,
    /// Slices were shipped to workers.
    pub distributed: bool,
    /// Frames ran in parallel.
    pub threaded: bool,
    /// Kernels ran on the accelerator.
    pub accelerated: bool,
    /// Frames came from a file rather than the generator.
    pub with_image: bool,
    /// Wall time in seconds.
    pub seconds: f64,
}

impl RunRecord {
    /// Log file name for this record's mode and flags.
    pub fn file_name(&self) -> String {
        format!(
            "runs{}_{}_{}_{}.log",
            if self.with_image { "_with_image" } else { "" },
            u8::from(self.distributed),
            u8::from(self.threaded),
            u8::from(self.accelerated)
        )
    }

    /// The CSV line, without a trailing newline.
    pub fn to_line(&self) -> String {
        format!(
            "{}, {}, {}, {}, {}, {}, {}, {}, {:.6}",
            self.tag,
            self.world_size,
            self.n_frames,
            self.width,
            self.height,
            u8::from(self.distributed),
            u8::from(self.threaded),
            u8::from(self.accelerated),
            self.seconds
        )
    }
}

/// Appends `record` to its log file under `dir`, creating `dir` if needed.
///
/// Returns the path written to.
pub fn append<P: AsRef<Path>>(dir: P, record: &RunRecord) -> IoResult<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let path = dir.join(record.file_name());

    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    writeln!(file, "{}", record.to_line())?;

    debug!(path = %path.display(), "appended run record");
    Ok(path)
}
