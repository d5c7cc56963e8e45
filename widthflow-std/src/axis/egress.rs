//! Master side of the converter.

use tracing::trace;
use widthflow::Beat;

use super::Repacker;

/// Egress adapter: one output register holding the oldest formed master beat.
#[derive(Debug, Clone, Default)]
pub struct Egress {
    slot: Option<Beat>,
    beats: u64,
    bytes: u64,
    packets: u64,
}

impl Egress {
    /// Creates an empty master side.
    pub fn new() -> Self { Self::default() }

    /// TVALID/TDATA/TLAST currently presented.
    pub fn peek(&self) -> Option<&Beat> { self.slot.as_ref() }

    /// Loads the next master beat from the engine if the register is empty.
    pub fn refill(&mut self, engine: &mut Repacker) {
        if self.slot.is_none() {
            self.slot = engine.step().next();
        }
    }

    /// Hands out the presented beat; the consumer is ready.
    pub fn try_emit(&mut self) -> Option<Beat> {
        let beat = self.slot.take()?;
        trace!(?beat, "emitted");

        self.beats += 1;
        self.bytes += beat.width() as u64;
        self.packets += u64::from(beat.is_last());
        Some(beat)
    }

    /// Returns emitted `(beats, bytes, packets)`.
    pub fn counters(&self) -> (u64, u64, u64) { (self.beats, self.bytes, self.packets) }

    /// Drops the presented beat and clears the counters.
    pub fn clear(&mut self) { *self = Self::default() }
}
