//! Regroups buffered bytes into master-width beats.

use tracing::trace;
use widthflow::{some_or, Beat, WidthError};

use crate::ByteRing;

/// Repacking engine.
///
/// Owns the byte buffer between the two sides. Bytes are addressed by their absolute offset in the logical stream:
/// `pushed` bytes have been appended so far and `popped` bytes have left as master beats. The end of the packet
/// currently in flight is remembered as the offset one past its last byte.
#[derive(Debug, Clone)]
pub struct Repacker {
    ring: ByteRing,
    master_width: usize,
    reverse: bool,
    pushed: u64,
    popped: u64,
    pending_last: Option<u64>,
}

impl Repacker {
    /// Creates an engine with a buffer of `capacity` bytes emitting `master_width`-byte beats.
    ///
    /// `reverse` flips every emitted beat.
    pub fn new(capacity: usize, master_width: usize, reverse: bool) -> Self {
        debug_assert!(capacity % master_width == 0);
        Self { ring: ByteRing::new(capacity), master_width, reverse, pushed: 0, popped: 0, pending_last: None }
    }

    /// Buffered bytes.
    pub fn buffered(&self) -> usize { self.ring.len() }

    /// Free bytes in the buffer.
    pub fn free(&self) -> usize { self.ring.free() }

    /// Capacity of the buffer.
    pub fn capacity(&self) -> usize { self.ring.capacity() }

    /// Width of the beats formed.
    pub fn master_width(&self) -> usize { self.master_width }

    /// Absolute end offset of the packet waiting for its last master beat.
    pub fn pending_last(&self) -> Option<u64> { self.pending_last }

    /// Checks that new bytes would not share a master beat with the end of the previous packet.
    pub fn check_framing(&self) -> Result<(), WidthError> {
        match self.pending_last {
            Some(end) if end % self.master_width as u64 != 0 => {
                Err(WidthError::MalformedFraming { end, master_width: self.master_width })
            }
            _ => Ok(()),
        }
    }

    /// Appends bytes at the tail. Returns `false` if they do not fit.
    ///
    /// If `last` is set, the end of the bytes is recorded as the end of the packet.
    pub fn append(&mut self, bytes: &[u8], last: bool) -> bool {
        if !self.ring.push(bytes) {
            return false;
        }

        self.pushed += bytes.len() as u64;
        if last {
            debug_assert!(self.pending_last.is_none(), "two packet ends in flight");
            self.pending_last = Some(self.pushed);
        }
        true
    }

    /// Forms one master beat from the front of the buffer, if enough bytes are buffered.
    pub fn pop_beat(&mut self) -> Option<Beat> {
        let start = self.popped;
        let data = some_or!(self.ring.pop(self.master_width), return None);
        self.popped += self.master_width as u64;

        let last = match self.pending_last {
            Some(end) if start < end && end <= self.popped => {
                self.pending_last = None;
                true
            }
            _ => false,
        };

        let mut beat = Beat::from_data(data, last);
        if self.reverse {
            beat.reverse();
        }
        trace!(offset = start, ?beat, "repacked");
        Some(beat)
    }

    /// Returns the master beats that can be formed now.
    ///
    /// The beats are formed lazily: bytes leave the buffer only as the iterator is advanced.
    pub fn step(&mut self) -> Drain<'_> { Drain { engine: self } }

    /// Drops all buffered bytes and the pending packet end, and restarts offsets from zero.
    pub fn clear(&mut self) {
        self.ring.clear();
        self.pushed = 0;
        self.popped = 0;
        self.pending_last = None;
    }
}

/// Iterator over the master beats ready in a [`Repacker`].
#[derive(Debug)]
pub struct Drain<'a> {
    engine: &'a mut Repacker,
}

impl Iterator for Drain<'_> {
    type Item = Beat;

    fn next(&mut self) -> Option<Beat> { self.engine.pop_beat() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(beats: &[Beat]) -> Vec<Vec<u8>> { beats.iter().map(|b| b.data().to_vec()).collect() }

    #[test]
    fn downsize_splits_in_order() {
        let mut engine = Repacker::new(4, 2, false);
        assert!(engine.append(&[1, 2, 3, 4], true));
        let beats = engine.step().collect::<Vec<_>>();
        assert_eq!(data(&beats), vec![vec![1, 2], vec![3, 4]]);
        assert_eq!(beats.iter().map(Beat::is_last).collect::<Vec<_>>(), vec![false, true]);
        assert_eq!(engine.buffered(), 0);
        assert_eq!(engine.pending_last(), None);
    }

    #[test]
    fn upsize_waits_for_full_beat() {
        let mut engine = Repacker::new(4, 4, false);
        assert!(engine.append(&[1, 2], false));
        assert_eq!(engine.step().count(), 0);
        assert!(engine.append(&[3, 4], true));
        let beats = engine.step().collect::<Vec<_>>();
        assert_eq!(data(&beats), vec![vec![1, 2, 3, 4]]);
        assert!(beats[0].is_last());
    }

    #[test]
    fn reverses_master_beats() {
        let mut engine = Repacker::new(4, 2, true);
        assert!(engine.append(&[1, 2, 3, 4], false));
        assert_eq!(data(&engine.step().collect::<Vec<_>>()), vec![vec![2, 1], vec![4, 3]]);
    }

    #[test]
    fn step_is_lazy() {
        let mut engine = Repacker::new(8, 2, false);
        assert!(engine.append(&[1, 2, 3, 4, 5, 6], false));
        assert_eq!(engine.step().next().unwrap().data(), &[1, 2]);
        assert_eq!(engine.buffered(), 4);
    }

    #[test]
    fn misaligned_packet_end_is_malformed() {
        let mut engine = Repacker::new(4, 4, false);
        assert!(engine.append(&[1, 2], true));
        assert_eq!(engine.check_framing(), Err(WidthError::MalformedFraming { end: 2, master_width: 4 }));
        engine.clear();
        assert_eq!(engine.check_framing(), Ok(()));
        assert_eq!(engine.buffered(), 0);
    }

    #[test]
    fn refuses_overflow() {
        let mut engine = Repacker::new(4, 2, false);
        assert!(engine.append(&[1, 2, 3, 4], false));
        assert!(!engine.append(&[5, 6, 7, 8], false));
        assert_eq!(engine.free(), 0);
        assert_eq!(engine.capacity(), 4);
    }
}
