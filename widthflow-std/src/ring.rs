//! Fixed-capacity byte ring.

use widthflow::{BeatData, MAX_BEAT_BYTES};

/// Byte FIFO over a fixed array with a head pointer and an occupancy count.
///
/// The usable capacity is chosen at construction and never exceeds [`MAX_BEAT_BYTES`].
#[derive(Debug, Clone)]
pub struct ByteRing {
    storage: [u8; MAX_BEAT_BYTES],
    /// Index of the oldest byte.
    head: usize,
    len: usize,
    capacity: usize,
}

impl ByteRing {
    /// Creates an empty ring holding at most `capacity` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or larger than [`MAX_BEAT_BYTES`].
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0 && capacity <= MAX_BEAT_BYTES, "ring capacity {} out of range", capacity);
        Self { storage: [0; MAX_BEAT_BYTES], head: 0, len: 0, capacity }
    }

    /// Number of buffered bytes.
    pub fn len(&self) -> usize { self.len }

    /// Whether no bytes are buffered.
    pub fn is_empty(&self) -> bool { self.len == 0 }

    /// Capacity in bytes.
    pub fn capacity(&self) -> usize { self.capacity }

    /// Free space in bytes.
    pub fn free(&self) -> usize { self.capacity - self.len }

    /// Appends bytes at the tail. Returns `false` without writing anything if they do not fit.
    pub fn push(&mut self, bytes: &[u8]) -> bool {
        if bytes.len() > self.free() {
            return false;
        }

        let mut tail = (self.head + self.len) % self.capacity;
        for byte in bytes {
            self.storage[tail] = *byte;
            tail = (tail + 1) % self.capacity;
        }
        self.len += bytes.len();
        true
    }

    /// Removes `n` bytes from the head. Returns `None` if fewer than `n` bytes are buffered.
    pub fn pop(&mut self, n: usize) -> Option<BeatData> {
        if n > self.len {
            return None;
        }

        let data = (0..n).map(|i| self.storage[(self.head + i) % self.capacity]).collect::<BeatData>();
        self.head = (self.head + n) % self.capacity;
        self.len -= n;
        Some(data)
    }

    /// Drops all bytes.
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }
}
