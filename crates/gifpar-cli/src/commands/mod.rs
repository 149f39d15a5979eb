//! CLI command implementations

pub mod backends;
pub mod bench;
pub mod run;

use anyhow::{Context, Result};
use gifpar_compute::{
    Accelerator, Capabilities, DistributionEngine, EngineConfig, ExecutionFlags, LocalTransport, NoAccelerator,
    RunSummary, Scheduler, ThreadTransport,
};
use gifpar_core::{FlattenedBuffer, FrameSequence};
use gifpar_io::{RunRecord, runlog};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Options shared by every command.
#[derive(Debug, Clone)]
pub struct Settings {
    pub verbose: u8,
    pub engine: EngineConfig,
    /// Ranks in the world, coordinator included.
    pub world_size: usize,
    /// Where run logs go.
    pub results_dir: PathBuf,
    pub run_log: bool,
}

/// The accelerator device for this build.
pub fn accelerator() -> Arc<dyn Accelerator> {
    Arc::new(NoAccelerator)
}

/// Load frames from path
pub fn load_frames(path: &Path) -> Result<FrameSequence> {
    gifpar_io::load(path).with_context(|| format!("Failed to load: {}", path.display()))
}

/// Save frames to path
pub fn save_frames(path: &Path, sequence: &FrameSequence) -> Result<()> {
    gifpar_io::save(path, sequence).with_context(|| format!("Failed to save: {}", path.display()))
}

/// Grayscale, blur and Sobel over the whole sequence, in place.
///
/// Returns the flags actually used and the engine's summary.
pub fn process(
    sequence: &mut FrameSequence,
    requested: ExecutionFlags,
    scheduler: Scheduler,
    settings: &Settings,
    device: Arc<dyn Accelerator>,
) -> Result<(ExecutionFlags, RunSummary)> {
    let world_size = settings.world_size;
    if world_size > sequence.len() + 1 {
        warn!(world_size, frames = sequence.len(), "more workers than frames, some will idle");
    }

    let caps = Capabilities::detect(device.as_ref());
    let flags = scheduler.resolve(requested, sequence.len(), &caps);
    info!(flags = %flags.describe(), benchmark = scheduler.benchmark, "execution flags");

    let pipeline = settings.engine.pipeline(flags, device, &caps).context("Failed to select kernel backend")?;

    gifpar_ops::grayscale::apply_gray_filter(sequence);
    let mut buffer = FlattenedBuffer::from_sequence(sequence).context("Failed to flatten frames")?;
    let engine = DistributionEngine::new(pipeline.clone());

    let summary = if Scheduler::should_distribute(flags, world_size) {
        let mut transport = ThreadTransport::spawn(world_size, buffer.geometry().into(), pipeline)
            .context("Failed to start workers")?;
        let result = engine.run(&mut buffer, flags, &mut transport);
        let shutdown = transport.shutdown();
        let summary = result.context("Distributed run failed")?;
        shutdown.context("Worker shutdown failed")?;
        summary
    } else {
        let mut transport = LocalTransport::new(world_size, pipeline);
        engine.run(&mut buffer, flags, &mut transport).context("Run failed")?
    };

    buffer.write_back(sequence).context("Failed to write frames back")?;
    Ok((flags, summary))
}

/// Appends the run record unless run logs are disabled.
pub fn record_run(
    settings: &Settings,
    tag: &str,
    sequence: &FrameSequence,
    flags: ExecutionFlags,
    summary: &RunSummary,
    with_image: bool,
) -> Result<()> {
    if !settings.run_log {
        return Ok(());
    }
    let first = sequence.frame(0)?;
    let record = RunRecord {
        tag: tag.to_string(),
        world_size: settings.world_size,
        n_frames: sequence.len(),
        width: first.width,
        height: first.height,
        distributed: flags.distributed,
        threaded: flags.threaded,
        accelerated: flags.accelerated,
        with_image,
        seconds: summary.seconds(),
    };
    let path = runlog::append(&settings.results_dir, &record)
        .with_context(|| format!("Failed to write run log in {}", settings.results_dir.display()))?;
    debug!(path = %path.display(), "run recorded");
    Ok(())
}
