//! Converter parameters.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::*;

/// Parameters of a width converter, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WidthConfig {
    /// Bytes per beat on the slave (ingress) side.
    pub slave_width: usize,

    /// Bytes per beat on the master (egress) side.
    pub master_width: usize,

    /// Reverses the byte order of every beat on the narrower side.
    pub reverse: bool,
}

impl Default for WidthConfig {
    fn default() -> Self { Self { slave_width: 1, master_width: 1, reverse: false } }
}

impl WidthConfig {
    /// Creates a new configuration.
    pub fn new(slave_width: usize, master_width: usize, reverse: bool) -> Self {
        Self { slave_width, master_width, reverse }
    }

    /// Checks the widths and returns their ratio.
    pub fn ratio(&self) -> Result<Ratio, WidthError> {
        let fault = |fault| WidthError::InvalidConfiguration {
            slave_width: self.slave_width,
            master_width: self.master_width,
            fault,
        };

        let (slave, master) = (self.slave_width, self.master_width);
        if slave == 0 || master == 0 {
            return Err(fault(ConfigFault::ZeroWidth));
        }
        if slave > MAX_BEAT_BYTES || master > MAX_BEAT_BYTES {
            return Err(fault(ConfigFault::TooWide));
        }

        if slave == master {
            Ok(Ratio::Equal)
        } else if master % slave == 0 {
            Ok(Ratio::Upsize(master / slave))
        } else if slave % master == 0 {
            Ok(Ratio::Downsize(slave / master))
        } else {
            Err(fault(ConfigFault::NonIntegerRatio))
        }
    }

    /// Capacity of the internal byte buffer: `lcm(slave_width, master_width)`.
    pub fn buffer_capacity(&self) -> usize { lcm(self.slave_width, self.master_width) }
}

/// Integer relation between slave and master widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ratio {
    /// Same width on both sides.
    Equal,

    /// Master is `k` times wider; `k` slave beats make one master beat.
    Upsize(usize),

    /// Slave is `k` times wider; one slave beat makes `k` master beats.
    Downsize(usize),
}

impl Ratio {
    /// Whether byte reversal happens on the slave side, when enabled.
    ///
    /// Reversal is applied to the beats of the narrower side, so it happens on the slave side only when upsizing.
    pub fn reverses_on_ingress(&self) -> bool { matches!(self, Ratio::Upsize(_)) }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ratio::Equal => write!(f, "1/1"),
            Ratio::Upsize(k) => write!(f, "{}/1", k),
            Ratio::Downsize(k) => write!(f, "1/{}", k),
        }
    }
}
