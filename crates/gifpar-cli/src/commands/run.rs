//! File mode
//!
//! Loads a GIF, lets the scheduler pick the strategy, filters and saves.
//! Distribution is requested whenever the world has more than one rank.

use crate::RunArgs;
use anyhow::Result;
use gifpar_compute::{ExecutionFlags, Scheduler};
use tracing::{info, trace};

use super::Settings;

pub fn run(args: RunArgs, settings: &Settings) -> Result<()> {
    trace!(input = %args.input.display(), output = %args.output.display(), "run::run");

    let mut sequence = super::load_frames(&args.input)?;
    let first = sequence.frame(0)?;
    info!(frames = sequence.len(), width = first.width, height = first.height, "loaded");

    let requested = ExecutionFlags { distributed: settings.world_size > 1, ..Default::default() };
    let (flags, summary) =
        super::process(&mut sequence, requested, Scheduler::auto(), settings, super::accelerator())?;

    super::save_frames(&args.output, &sequence)?;
    super::record_run(settings, &args.tag, &sequence, flags, &summary, true)?;

    if settings.verbose > 0 {
        println!(
            "Filtered {} frames in {:.6} s ({}) -> {}",
            summary.frames,
            summary.seconds(),
            summary.strategy,
            args.output.display()
        );
    }
    Ok(())
}
