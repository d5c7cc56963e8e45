//! Errors.

use thiserror::Error;

/// Why a width configuration was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigFault {
    /// One of the sides is zero bytes wide.
    #[error("a side has zero width")]
    ZeroWidth,

    /// One of the sides is wider than [`crate::MAX_BEAT_BYTES`].
    #[error("a side is wider than {max} bytes", max = crate::MAX_BEAT_BYTES)]
    TooWide,

    /// Neither width divides the other.
    #[error("widths are not related by an integer ratio")]
    NonIntegerRatio,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidthError {
    #[error("invalid configuration (slave {slave_width} bytes, master {master_width} bytes): {fault}")]
    InvalidConfiguration { slave_width: usize, master_width: usize, fault: ConfigFault },

    #[error("malformed framing: a packet ended at byte {end}, inside a {master_width}-byte master beat")]
    MalformedFraming { end: u64, master_width: usize },

    #[error("beat width mismatch: expected {expected} bytes, got {actual}")]
    BeatWidth { expected: usize, actual: usize },

    #[error("beat of {width} bytes is wider than the {max}-byte limit")]
    BeatTooWide { width: usize, max: usize },

    #[error("frame of {length} bytes does not split into {width}-byte beats")]
    FrameLength { length: usize, width: usize },
}
