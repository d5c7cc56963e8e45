//! Testbench for the AXI4-Stream width converter.
//!
//! Generates traffic, clocks it through a converter and prints a JSON report.

mod bench;

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use widthflow::WidthConfig;

use crate::bench::Mode;

#[derive(Debug, Parser)]
#[command(name = "widthflow-tb", about = "Drive traffic through an AXI4-Stream width converter")]
struct Cli {
    /// JSON file with `slave_width`, `master_width` and `reverse`
    #[arg(long, env = "WIDTHFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Slave (ingress) width in bytes, overrides the file
    #[arg(long, env = "WIDTHFLOW_SLAVE_WIDTH")]
    slave_width: Option<usize>,

    /// Master (egress) width in bytes, overrides the file
    #[arg(long, env = "WIDTHFLOW_MASTER_WIDTH")]
    master_width: Option<usize>,

    /// Reverse the byte order of the narrower side's beats
    #[arg(long)]
    reverse: bool,

    /// Traffic pattern
    #[arg(long, value_enum, default_value_t = Mode::Conversion)]
    mode: Mode,

    /// Number of frames (conversion) or frame length in units of 4 beats (random-ready)
    #[arg(long, default_value_t = 256)]
    frames: usize,

    /// Seed for random data and sink stalls
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Cycle budget per frame
    #[arg(long, default_value_t = 1_000_000)]
    max_cycles: u64,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(cli: &Cli) -> Result<WidthConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => WidthConfig::default(),
    };

    if let Some(width) = cli.slave_width {
        config.slave_width = width;
    }
    if let Some(width) = cli.master_width {
        config.master_width = width;
    }
    config.reverse |= cli.reverse;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).with_target(false).with_writer(std::io::stderr).init();

    let config = load_config(&cli)?;
    info!(?config, mode = ?cli.mode, frames = cli.frames, seed = cli.seed, "starting");

    let mut rng = StdRng::seed_from_u64(cli.seed);
    let report = bench::run(config, cli.mode, cli.frames, cli.max_cycles, &mut rng)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.passed() {
        bail!("{} of {} frames did not match", report.frames_sent - report.frames_matched, report.frames_sent);
    }
    info!(cycles = report.cycles, "passed");
    Ok(())
}
