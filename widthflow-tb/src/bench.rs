//! Traffic patterns driven through a converter.

use clap::ValueEnum;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};
use widthflow::{WidthConfig, WidthError};
use widthflow_std::sim::{Frame, PauseGenerator, Testbench};
use widthflow_std::Stats;

/// Traffic pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// One frame per byte value, each the width of the wider side, sink always ready.
    Conversion,
    /// One long frame of random bytes, sink stalling on a random pattern.
    RandomReady,
}

/// Outcome of a run.
#[derive(Debug, Serialize)]
pub struct Report {
    pub config: WidthConfig,
    pub ratio: String,
    pub mode: Mode,
    pub frames_sent: usize,
    pub frames_matched: usize,
    pub cycles: u64,
    pub stats: Stats,
}

impl Report {
    pub fn passed(&self) -> bool { self.frames_matched == self.frames_sent }
}

/// Builds the frames of `mode`. Every frame is a multiple of the wider side so that packets stay aligned.
fn frames<R: Rng>(config: &WidthConfig, mode: Mode, count: usize, rng: &mut R) -> Vec<Frame> {
    let width = config.slave_width.max(config.master_width);
    match mode {
        Mode::Conversion => (0..count).map(|x| Frame::new(vec![x as u8; width])).collect(),
        Mode::RandomReady => {
            let data = (0..count * 4).flat_map(|_| vec![rng.gen::<u8>(); width]).collect();
            vec![Frame::new(data)]
        }
    }
}

/// Drives `count` frames of `mode` through a converter and checks what comes out.
pub fn run<R: Rng>(
    config: WidthConfig, mode: Mode, count: usize, max_cycles: u64, rng: &mut R,
) -> Result<Report, WidthError> {
    let mut tb = Testbench::new(config)?;
    if mode == Mode::RandomReady {
        tb.sink_mut().set_pause_generator(PauseGenerator::random(rng));
    }

    let frames = frames(&config, mode, count, rng);
    let mut frames_matched = 0;
    for (i, frame) in frames.iter().enumerate() {
        tb.source_mut().send(frame)?;
        if !tb.run_until_idle(max_cycles)? {
            info!(frame = i, cycles = tb.cycles(), "gave up waiting for the converter to drain");
            break;
        }

        match tb.sink_mut().recv() {
            Some(received) if received == *frame => frames_matched += 1,
            received => debug!(frame = i, ?received, "mismatch"),
        }
    }

    Ok(Report {
        config,
        ratio: tb.dut().ratio().to_string(),
        mode,
        frames_sent: frames.len(),
        frames_matched,
        cycles: tb.cycles(),
        stats: tb.dut().stats(),
    })
}
