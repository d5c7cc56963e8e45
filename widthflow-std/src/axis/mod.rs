//! AXI4-Stream data width converter.
//!
//! Change the size of a streaming bus by integer ratios (1/2, 2/1, 2/4, 4/2, ...). The converter is split into three
//! parts that share one byte buffer:
//!
//! - [`Ingress`]: the slave side, accepts `slave_width`-byte beats.
//! - [`Repacker`]: regroups the buffered bytes into `master_width`-byte beats and re-derives TLAST.
//! - [`Egress`]: the master side, a single output register.

use serde::{Deserialize, Serialize};

mod converter;
mod egress;
mod ingress;
mod repack;
mod shared;
pub mod sim;

pub use converter::WidthConverter;
pub use egress::Egress;
pub use ingress::{Accept, Ingress};
pub use repack::{Drain, Repacker};
pub use shared::SharedConverter;

/// Transfer counters of a converter since construction or the last reset.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Beats accepted on the slave side.
    pub accepted_beats: u64,
    /// Bytes accepted on the slave side.
    pub accepted_bytes: u64,
    /// Beats with TLAST accepted on the slave side.
    pub packets_in: u64,
    /// Beats emitted on the master side.
    pub emitted_beats: u64,
    /// Bytes emitted on the master side.
    pub emitted_bytes: u64,
    /// Beats with TLAST emitted on the master side.
    pub packets_out: u64,
}
