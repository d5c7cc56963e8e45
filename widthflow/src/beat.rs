//! AXI4-Stream beats.

use std::fmt;

use arrayvec::ArrayVec;
use static_assertions::const_assert;

use crate::WidthError;

/// Widest beat in bytes (AXI4-Stream TDATA of 1024 bits).
pub const MAX_BEAT_BYTES: usize = 128;

const_assert!(MAX_BEAT_BYTES.is_power_of_two());

/// Inline storage of one beat's TDATA.
pub type BeatData = ArrayVec<u8, MAX_BEAT_BYTES>;

/// One transfer of an AXI4-Stream interface: TDATA plus TLAST.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Beat {
    data: BeatData,
    last: bool,
}

impl Beat {
    /// Creates a beat from bytes.
    pub fn new(bytes: &[u8], last: bool) -> Result<Self, WidthError> {
        let data = BeatData::try_from(bytes)
            .map_err(|_| WidthError::BeatTooWide { width: bytes.len(), max: MAX_BEAT_BYTES })?;
        Ok(Self { data, last })
    }

    /// Creates a beat from already collected data.
    pub fn from_data(data: BeatData, last: bool) -> Self { Self { data, last } }

    /// AXI4-Stream TDATA.
    pub fn data(&self) -> &[u8] { &self.data }

    /// AXI4-Stream TLAST.
    pub fn is_last(&self) -> bool { self.last }

    /// Width in bytes.
    pub fn width(&self) -> usize { self.data.len() }

    /// Reverses the byte order in place.
    pub fn reverse(&mut self) { self.data.reverse() }

    /// Sets TLAST.
    pub fn set_last(&mut self, last: bool) { self.last = last }

    /// Splits the beat into its data and TLAST.
    pub fn into_parts(self) -> (BeatData, bool) { (self.data, self.last) }
}

impl fmt::Debug for Beat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Beat[")?;
        for (i, byte) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        write!(f, "]{}", if self.last { " last" } else { "" })
    }
}
