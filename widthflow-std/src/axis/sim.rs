//! Cycle-level simulation harness: a frame source, a frame sink with pausing, and a testbench clocking both around a
//! converter.

use std::collections::VecDeque;

use itertools::{Itertools, Position};
use rand::Rng;
use widthflow::{align_usize, Beat, Clocked, Ready, Valid, WidthConfig, WidthError};

use super::WidthConverter;

/// A packet: the bytes between two TLASTs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    /// Payload.
    pub data: Vec<u8>,
}

impl Frame {
    /// Creates a frame.
    pub fn new(data: Vec<u8>) -> Self { Self { data } }

    /// Pads with zero bytes up to a multiple of `align`.
    pub fn padded(mut self, align: usize) -> Self {
        self.data.resize(align_usize(self.data.len(), align), 0);
        self
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize { self.data.len() }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool { self.data.is_empty() }
}

/// Cyclic pattern deciding on which cycles a sink stalls. `true` means paused.
#[derive(Debug, Clone)]
pub struct PauseGenerator {
    pattern: Vec<bool>,
    index: usize,
}

impl PauseGenerator {
    /// Repeats the given pattern forever.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is empty.
    pub fn new(pattern: Vec<bool>) -> Self {
        assert!(!pattern.is_empty(), "empty pause pattern");
        Self { pattern, index: 0 }
    }

    /// Repeats 256 random decisions forever.
    pub fn random<R: Rng>(rng: &mut R) -> Self { Self::new((0..256).map(|_| rng.gen()).collect()) }

    /// Decision for the next cycle.
    pub fn next_pause(&mut self) -> bool {
        let pause = self.pattern[self.index];
        self.index = (self.index + 1) % self.pattern.len();
        pause
    }
}

/// Drives frames into a slave port, one beat per transfer.
#[derive(Debug, Clone)]
pub struct AxisSource {
    width: usize,
    beats: VecDeque<Beat>,
}

impl AxisSource {
    /// Creates a source of `width`-byte beats.
    pub fn new(width: usize) -> Self { Self { width, beats: VecDeque::new() } }

    /// Queues a frame. Its length has to be a non-zero multiple of the width.
    pub fn send(&mut self, frame: &Frame) -> Result<(), WidthError> {
        if frame.is_empty() || frame.len() % self.width != 0 {
            return Err(WidthError::FrameLength { length: frame.len(), width: self.width });
        }

        for chunk in frame.data.chunks(self.width).with_position() {
            let last = matches!(chunk, Position::Last(_) | Position::Only(_));
            self.beats.push_back(Beat::new(chunk.into_inner(), last)?);
        }
        Ok(())
    }

    /// TVALID/TDATA/TLAST for this cycle.
    pub fn fwd(&self) -> Valid<Beat> { self.beats.front().cloned().into() }

    /// Retires the presented beat after a transfer.
    pub fn fire(&mut self) { self.beats.pop_front(); }

    /// Whether all queued beats have been transferred.
    pub fn is_idle(&self) -> bool { self.beats.is_empty() }
}

/// Collects beats from a master port into frames.
#[derive(Debug, Clone)]
pub struct AxisSink {
    width: usize,
    pause: Option<PauseGenerator>,
    current: Vec<u8>,
    frames: VecDeque<Frame>,
    beats: u64,
}

impl AxisSink {
    /// Creates a sink of `width`-byte beats that is always ready.
    pub fn new(width: usize) -> Self {
        Self { width, pause: None, current: Vec::new(), frames: VecDeque::new(), beats: 0 }
    }

    /// Stalls on the cycles chosen by `pause`.
    pub fn set_pause_generator(&mut self, pause: PauseGenerator) { self.pause = Some(pause); }

    /// Becomes always ready again.
    pub fn clear_pause_generator(&mut self) { self.pause = None; }

    /// TREADY for this cycle.
    pub fn ready(&mut self) -> Ready {
        let paused = self.pause.as_mut().map_or(false, PauseGenerator::next_pause);
        Ready::new(!paused)
    }

    /// Takes a transferred beat.
    pub fn receive(&mut self, beat: Beat) -> Result<(), WidthError> {
        if beat.width() != self.width {
            return Err(WidthError::BeatWidth { expected: self.width, actual: beat.width() });
        }

        self.beats += 1;
        self.current.extend_from_slice(beat.data());
        if beat.is_last() {
            self.frames.push_back(Frame::new(std::mem::take(&mut self.current)));
        }
        Ok(())
    }

    /// Pops the oldest completed frame.
    pub fn recv(&mut self) -> Option<Frame> { self.frames.pop_front() }

    /// Beats received so far.
    pub fn beats(&self) -> u64 { self.beats }

    /// Bytes received after the last TLAST.
    pub fn partial(&self) -> &[u8] { &self.current }
}

/// Clocks a source, a converter and a sink together.
#[derive(Debug, Clone)]
pub struct Testbench {
    dut: WidthConverter,
    source: AxisSource,
    sink: AxisSink,
    cycles: u64,
}

impl Testbench {
    /// Creates a testbench around a new converter.
    pub fn new(config: WidthConfig) -> Result<Self, WidthError> {
        Ok(Self {
            dut: WidthConverter::new(config)?,
            source: AxisSource::new(config.slave_width),
            sink: AxisSink::new(config.master_width),
            cycles: 0,
        })
    }

    /// Device under test.
    pub fn dut(&self) -> &WidthConverter { &self.dut }

    /// Device under test.
    pub fn dut_mut(&mut self) -> &mut WidthConverter { &mut self.dut }

    /// Slave-side driver.
    pub fn source_mut(&mut self) -> &mut AxisSource { &mut self.source }

    /// Master-side monitor.
    pub fn sink_mut(&mut self) -> &mut AxisSink { &mut self.sink }

    /// Cycles elapsed.
    pub fn cycles(&self) -> u64 { self.cycles }

    /// Advances one clock cycle.
    pub fn cycle(&mut self) -> Result<(), WidthError> {
        let ingress_fwd = self.source.fwd();
        let egress_bwd = self.sink.ready();

        let (egress_fwd, ingress_bwd) = self.dut.tick(&ingress_fwd, egress_bwd)?;
        self.cycles += 1;

        if ingress_fwd.is_valid() && ingress_bwd.ready {
            self.source.fire();
        }
        if let (Some(beat), true) = (egress_fwd.into_inner(), egress_bwd.ready) {
            self.sink.receive(beat)?;
        }
        Ok(())
    }

    /// Whether the source is drained and the converter holds nothing.
    pub fn is_idle(&self) -> bool { self.source.is_idle() && self.dut.is_idle() }

    /// Clocks until idle or until `max_cycles` more cycles have run. Returns whether it went idle.
    pub fn run_until_idle(&mut self, max_cycles: u64) -> Result<bool, WidthError> {
        for _ in 0..max_cycles {
            if self.is_idle() {
                return Ok(true);
            }
            self.cycle()?;
        }
        Ok(self.is_idle())
    }
}
