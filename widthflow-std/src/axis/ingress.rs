//! Slave side of the converter.

use tracing::{trace, warn};
use widthflow::{Beat, WidthError};

use super::Repacker;

/// Outcome of offering a beat to the slave side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accept {
    /// The beat was transferred.
    Accepted,

    /// TREADY is low. The beat is handed back and has to be offered again later.
    WouldBlock(Beat),
}

/// Ingress adapter.
#[derive(Debug, Clone)]
pub struct Ingress {
    width: usize,
    reverse: bool,
    beats: u64,
    bytes: u64,
    packets: u64,
}

impl Ingress {
    /// Creates the slave side for `width`-byte beats. `reverse` flips every accepted beat.
    pub fn new(width: usize, reverse: bool) -> Self { Self { width, reverse, beats: 0, bytes: 0, packets: 0 } }

    /// Beat width in bytes.
    pub fn width(&self) -> usize { self.width }

    /// TREADY: whether a whole beat fits, and leaves fewer than `capacity` bytes buffered once a free output
    /// register has taken the master beat it completes.
    pub fn is_ready(&self, engine: &Repacker, register_free: bool) -> bool {
        if engine.free() < self.width {
            return false;
        }

        let mut buffered = engine.buffered() + self.width;
        if register_free && buffered >= engine.master_width() {
            buffered -= engine.master_width();
        }
        buffered < engine.capacity()
    }

    /// Checks that `beat` could be taken at all: its width, and the framing of the packet before it.
    pub fn check(&self, beat: &Beat, engine: &Repacker) -> Result<(), WidthError> {
        if beat.width() != self.width {
            return Err(WidthError::BeatWidth { expected: self.width, actual: beat.width() });
        }
        engine.check_framing().map_err(|e| {
            warn!(error = %e, "rejecting beat");
            e
        })
    }

    /// Offers a beat. Acceptance is all or nothing.
    pub fn try_accept(
        &mut self, mut beat: Beat, engine: &mut Repacker, register_free: bool,
    ) -> Result<Accept, WidthError> {
        self.check(&beat, engine)?;
        if !self.is_ready(engine, register_free) {
            return Ok(Accept::WouldBlock(beat));
        }

        trace!(?beat, "accepted");
        if self.reverse {
            beat.reverse();
        }
        let appended = engine.append(beat.data(), beat.is_last());
        debug_assert!(appended);

        self.beats += 1;
        self.bytes += self.width as u64;
        self.packets += u64::from(beat.is_last());
        Ok(Accept::Accepted)
    }

    /// Returns accepted `(beats, bytes, packets)`.
    pub fn counters(&self) -> (u64, u64, u64) { (self.beats, self.bytes, self.packets) }

    /// Clears the counters.
    pub fn clear(&mut self) {
        self.beats = 0;
        self.bytes = 0;
        self.packets = 0;
    }
}
