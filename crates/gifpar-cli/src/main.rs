//! gifpar - parallel blur + Sobel over animated GIFs
//!
//! File mode filters a GIF; benchmark mode filters generated (or loaded)
//! frames with explicit execution flags and records the timing.

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use gifpar_compute::EngineConfig;
use gifpar_io::synthetic::DEFAULT_SEED;
use gifpar_ops::BlurParams;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "gifpar")]
#[command(author, version, about = "Parallel blur + Sobel filtering of animated GIFs")]
#[command(long_about = "
Applies a convergent box blur followed by Sobel edge detection to every
frame of an animated GIF. Frames are split across worker ranks, processed
frame-parallel inside each rank, and optionally on an accelerator.

Examples:
  gifpar run in.gif out.gif                   # auto-selected strategy
  gifpar -n 4 run in.gif out.gif              # 3 worker ranks
  gifpar bench --frames 64 --width 640 --height 480 --tag 1 --threaded
  gifpar -n 5 bench --frames 32 --width 320 --height 240 --distributed
  gifpar backends                             # list kernel backends
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,

    /// Ranks in the world, coordinator included (1 = no workers)
    #[arg(short = 'n', long, global = true, env = "GIFPAR_WORLD_SIZE", default_value = "1")]
    world_size: usize,

    /// Blur stencil radius
    #[arg(long, global = true, default_value = "5")]
    radius: usize,

    /// Blur convergence threshold (<= 0 runs a single pass)
    #[arg(long, global = true, default_value = "20", allow_negative_numbers = true)]
    threshold: i32,

    /// Directory for run logs
    #[arg(long, global = true, default_value = "results")]
    results_dir: PathBuf,

    /// Do not append a run record
    #[arg(long, global = true)]
    no_run_log: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Filter an animated GIF
    #[command(visible_alias = "r")]
    Run(RunArgs),

    /// Benchmark with explicit execution flags
    #[command(visible_alias = "b")]
    Bench(BenchArgs),

    /// List kernel backends
    Backends,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Input GIF
    input: PathBuf,

    /// Output GIF
    output: PathBuf,

    /// Label stored in the run log
    #[arg(long, default_value = "0")]
    tag: String,
}

#[derive(Args, Debug)]
struct BenchArgs {
    /// Frames to generate
    #[arg(long, required_unless_present = "input")]
    frames: Option<usize>,

    /// Frame width
    #[arg(long, required_unless_present = "input")]
    width: Option<u32>,

    /// Frame height
    #[arg(long, required_unless_present = "input")]
    height: Option<u32>,

    /// Label stored in the run log
    #[arg(long, default_value = "0")]
    tag: String,

    /// Ship slices to worker ranks
    #[arg(long)]
    distributed: bool,

    /// Process frames in parallel
    #[arg(long)]
    threaded: bool,

    /// Use the accelerator
    #[arg(long)]
    accelerated: bool,

    /// Load frames from this GIF instead of generating them
    #[arg(long, requires = "output")]
    input: Option<PathBuf>,

    /// Write the filtered frames here
    #[arg(long, requires = "input")]
    output: Option<PathBuf>,

    /// Seed for generated frames
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
}

/// Installs the tracing subscriber. The returned guard must outlive every
/// log call when writing to a file.
fn init_logging(verbose: u8, log: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match log {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file: {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.verbose, cli.log.as_deref())?;

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let settings = commands::Settings {
        verbose: cli.verbose,
        engine: EngineConfig { blur: BlurParams::new(cli.radius, cli.threshold) },
        world_size: cli.world_size,
        results_dir: cli.results_dir,
        run_log: !cli.no_run_log,
    };

    match cli.command {
        Commands::Run(args) => commands::run::run(args, &settings),
        Commands::Bench(args) => commands::bench::run(args, &settings),
        Commands::Backends => commands::backends::run(&settings),
    }
}
