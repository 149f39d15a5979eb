//! Benchmark mode
//!
//! Uses the given flags verbatim. Frames are generated from a seed unless
//! `--input` is given; the timing always goes to the run log.

use crate::BenchArgs;
use anyhow::{Result, bail};
use gifpar_compute::{ExecutionFlags, Scheduler};
use gifpar_io::synthetic;
use tracing::{info, trace};

use super::Settings;

pub fn run(args: BenchArgs, settings: &Settings) -> Result<()> {
    trace!(tag = %args.tag, distributed = args.distributed, threaded = args.threaded, accelerated = args.accelerated, "bench::run");

    let mut sequence = match &args.input {
        Some(path) => super::load_frames(path)?,
        None => {
            let (Some(frames), Some(width), Some(height)) = (args.frames, args.width, args.height) else {
                bail!("--frames, --width and --height are required without --input");
            };
            synthetic::generate(frames, width, height, args.seed)?
        }
    };
    info!(frames = sequence.len(), with_image = args.input.is_some(), "benchmark frames ready");

    let requested = ExecutionFlags {
        distributed: args.distributed,
        threaded: args.threaded,
        accelerated: args.accelerated,
    };
    let (flags, summary) =
        super::process(&mut sequence, requested, Scheduler::benchmark(), settings, super::accelerator())?;

    if let Some(output) = &args.output {
        super::save_frames(output, &sequence)?;
    }
    super::record_run(settings, &args.tag, &sequence, flags, &summary, args.input.is_some())?;

    println!(
        "Filtered {} frames in {:.6} s ({})",
        summary.frames,
        summary.seconds(),
        summary.strategy
    );
    Ok(())
}
