//! The width converter: ingress, repacking engine and egress around one buffer.

use tracing::{debug, trace};
use widthflow::{Beat, Clocked, Ratio, Ready, Valid, WidthConfig, WidthError};

use super::{Accept, Egress, Ingress, Repacker, Stats};

/// AXI4-Stream data width converter.
///
/// A purely reactive state machine: nothing happens between calls. [`WidthConverter::try_accept`] and
/// [`WidthConverter::try_emit`] are the transaction-level ports, [`Clocked::tick`] the cycle-level one.
///
/// # Byte order
///
/// With `reverse` set, every beat of the narrower side is byte-reversed: master beats when downsizing, slave beats
/// when upsizing, and each beat once when the widths are equal. Two converters in series with mirrored widths and
/// the same `reverse` reproduce their input.
///
/// # Framing
///
/// A packet must end on a master beat boundary. If it ends inside a master beat, the next beat offered is refused
/// with [`WidthError::MalformedFraming`] and the converter stays stuck until it is reset.
#[derive(Debug, Clone)]
pub struct WidthConverter {
    config: WidthConfig,
    ratio: Ratio,
    ingress: Ingress,
    engine: Repacker,
    egress: Egress,
    in_reset: bool,
}

impl WidthConverter {
    /// Creates a converter. Fails with [`WidthError::InvalidConfiguration`] if the widths are not related by an
    /// integer ratio.
    pub fn new(config: WidthConfig) -> Result<Self, WidthError> {
        let ratio = config.ratio()?;
        let reverse_ingress = config.reverse && ratio.reverses_on_ingress();
        let reverse_egress = config.reverse && !ratio.reverses_on_ingress();

        debug!(
            slave_width = config.slave_width,
            master_width = config.master_width,
            reverse = config.reverse,
            %ratio,
            "width converter created"
        );

        Ok(Self {
            config,
            ratio,
            ingress: Ingress::new(config.slave_width, reverse_ingress),
            engine: Repacker::new(config.buffer_capacity(), config.master_width, reverse_egress),
            egress: Egress::new(),
            in_reset: false,
        })
    }

    /// Configuration.
    pub fn config(&self) -> &WidthConfig { &self.config }

    /// Width ratio.
    pub fn ratio(&self) -> Ratio { self.ratio }

    /// S_AXIS_TREADY.
    pub fn is_ready(&self) -> bool { !self.in_reset && self.ingress.is_ready(&self.engine, self.register_free()) }

    /// Offers a slave beat.
    ///
    /// Returns [`Accept::WouldBlock`] with the beat if TREADY is low, which is flow control rather than an error.
    pub fn try_accept(&mut self, beat: Beat) -> Result<Accept, WidthError> {
        if self.in_reset {
            return Ok(Accept::WouldBlock(beat));
        }

        let register_free = self.register_free();
        let accept = self.ingress.try_accept(beat, &mut self.engine, register_free)?;
        if accept == Accept::Accepted {
            self.egress.refill(&mut self.engine);
        }
        Ok(accept)
    }

    /// M_AXIS_TVALID/TDATA/TLAST currently presented.
    pub fn peek(&self) -> Option<&Beat> { self.egress.peek() }

    /// Takes the presented master beat; the consumer is ready.
    pub fn try_emit(&mut self) -> Option<Beat> {
        let beat = self.egress.try_emit()?;
        self.egress.refill(&mut self.engine);
        Some(beat)
    }

    /// Bytes buffered between the sides, not counting the master output register.
    pub fn buffered(&self) -> usize { self.engine.buffered() }

    /// Free bytes in the buffer.
    pub fn free_space(&self) -> usize { self.engine.free() }

    /// Buffer capacity, `lcm(slave_width, master_width)`.
    pub fn capacity(&self) -> usize { self.engine.capacity() }

    /// Whether nothing is buffered or presented.
    pub fn is_idle(&self) -> bool { self.engine.buffered() == 0 && self.egress.peek().is_none() }

    /// Transfer counters.
    pub fn stats(&self) -> Stats {
        let (accepted_beats, accepted_bytes, packets_in) = self.ingress.counters();
        let (emitted_beats, emitted_bytes, packets_out) = self.egress.counters();
        Stats { accepted_beats, accepted_bytes, packets_in, emitted_beats, emitted_bytes, packets_out }
    }

    /// Drives the active-low reset. While asserted, S_AXIS_TREADY and M_AXIS_TVALID are low and all state is cleared.
    pub fn set_reset(&mut self, asserted: bool) {
        if asserted {
            self.clear();
        }
        if asserted != self.in_reset {
            debug!(asserted, "reset");
        }
        self.in_reset = asserted;
    }

    /// Whether reset is asserted.
    pub fn in_reset(&self) -> bool { self.in_reset }

    /// Pulses reset: clears all state and leaves the converter running.
    pub fn reset(&mut self) {
        self.set_reset(true);
        self.set_reset(false);
    }

    fn register_free(&self) -> bool { self.egress.peek().is_none() }

    fn clear(&mut self) {
        self.ingress.clear();
        self.engine.clear();
        self.egress.clear();
    }
}

impl Clocked for WidthConverter {
    type Error = WidthError;
    type In = Beat;
    type Out = Beat;

    fn tick(&mut self, ingress_fwd: &Valid<Beat>, egress_bwd: Ready) -> Result<(Valid<Beat>, Ready), WidthError> {
        // A slave beat that can never be taken is refused before anything moves.
        if let (Some(beat), false) = (ingress_fwd.inner(), self.in_reset) {
            self.ingress.check(beat, &self.engine)?;
        }

        // M_AXIS_* come from the output register before the clock edge.
        let egress_fwd = Valid::from(self.peek().cloned());
        if egress_bwd.ready && egress_fwd.is_valid() {
            self.try_emit();
        }

        // S_AXIS_TREADY sees the room made by a master transfer in the same cycle.
        let ingress_bwd = Ready::new(self.is_ready());
        trace!(tvalid = egress_fwd.is_valid(), tready = ingress_bwd.ready, "tick");

        if let (Some(beat), true) = (ingress_fwd.inner(), ingress_bwd.ready) {
            let accept = self.try_accept(beat.clone())?;
            debug_assert_eq!(accept, Accept::Accepted);
        }

        Ok((egress_fwd, ingress_bwd))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beat(bytes: &[u8], last: bool) -> Beat { Beat::new(bytes, last).unwrap() }

    #[test]
    fn rejects_unrelated_widths() {
        assert!(matches!(
            WidthConverter::new(WidthConfig::new(3, 5, false)),
            Err(WidthError::InvalidConfiguration { slave_width: 3, master_width: 5, .. })
        ));
    }

    #[test]
    fn equal_width_reverse_is_a_flip() {
        let mut conv = WidthConverter::new(WidthConfig::new(4, 4, true)).unwrap();
        assert_eq!(conv.try_accept(beat(&[1, 2, 3, 4], true)), Ok(Accept::Accepted));
        assert_eq!(conv.try_emit(), Some(beat(&[4, 3, 2, 1], true)));
        assert!(conv.is_idle());
    }

    #[test]
    fn upsize_reverse_flips_slave_beats() {
        let mut conv = WidthConverter::new(WidthConfig::new(2, 4, true)).unwrap();
        assert_eq!(conv.try_accept(beat(&[1, 2], false)), Ok(Accept::Accepted));
        assert_eq!(conv.try_accept(beat(&[3, 4], true)), Ok(Accept::Accepted));
        assert_eq!(conv.try_emit(), Some(beat(&[2, 1, 4, 3], true)));
    }

    #[test]
    fn reset_blocks_and_clears() {
        let mut conv = WidthConverter::new(WidthConfig::new(2, 4, false)).unwrap();
        assert_eq!(conv.try_accept(beat(&[1, 2], false)), Ok(Accept::Accepted));
        assert_eq!(conv.buffered(), 2);

        conv.set_reset(true);
        assert!(!conv.is_ready());
        assert_eq!(conv.buffered(), 0);
        assert_eq!(conv.try_accept(beat(&[3, 4], false)), Ok(Accept::WouldBlock(beat(&[3, 4], false))));
        assert_eq!(conv.stats(), Stats::default());

        conv.set_reset(false);
        assert!(conv.is_ready());
    }

    #[test]
    fn reset_recovers_from_malformed_framing() {
        let mut conv = WidthConverter::new(WidthConfig::new(2, 4, false)).unwrap();
        assert_eq!(conv.try_accept(beat(&[1, 2], true)), Ok(Accept::Accepted));
        assert_eq!(
            conv.try_accept(beat(&[3, 4], false)),
            Err(WidthError::MalformedFraming { end: 2, master_width: 4 })
        );

        conv.reset();
        assert_eq!(conv.try_accept(beat(&[3, 4], false)), Ok(Accept::Accepted));
        assert_eq!(conv.try_accept(beat(&[5, 6], true)), Ok(Accept::Accepted));
        assert_eq!(conv.try_emit(), Some(beat(&[3, 4, 5, 6], true)));
    }

    #[test]
    fn tick_transfers_on_valid_and_ready() {
        let mut conv = WidthConverter::new(WidthConfig::new(4, 2, false)).unwrap();
        let input = Valid::valid(beat(&[1, 2, 3, 4], true));

        // Cycle 0: slave transfer, nothing presented yet.
        let (fwd, bwd) = conv.tick(&input, Ready::new(true)).unwrap();
        assert!(bwd.ready);
        assert!(!fwd.is_valid());

        // Cycle 1: first half presented and taken; the slave side is still full.
        let (fwd, bwd) = conv.tick(&input, Ready::new(true)).unwrap();
        assert!(!bwd.ready);
        assert_eq!(fwd.into_inner(), Some(beat(&[1, 2], false)));

        // Cycle 2: consumer stalls.
        let (fwd, _) = conv.tick(&Valid::invalid(), Ready::new(false)).unwrap();
        assert_eq!(fwd.into_inner(), Some(beat(&[3, 4], true)));
        let (fwd, _) = conv.tick(&Valid::invalid(), Ready::new(true)).unwrap();
        assert_eq!(fwd.into_inner(), Some(beat(&[3, 4], true)));
        assert!(conv.is_idle());
        assert_eq!(conv.stats().packets_out, 1);
    }

    #[test]
    fn tick_keeps_presented_beat_on_malformed_framing() {
        let mut conv = WidthConverter::new(WidthConfig::new(2, 4, false)).unwrap();
        assert_eq!(conv.try_accept(beat(&[1, 2], false)), Ok(Accept::Accepted));
        assert_eq!(conv.try_accept(beat(&[3, 4], true)), Ok(Accept::Accepted));
        assert_eq!(conv.try_accept(beat(&[5, 6], true)), Ok(Accept::Accepted));

        // The consumer is ready for [1 2 3 4] in the cycle the misframed beat shows up.
        let result = conv.tick(&Valid::valid(beat(&[7, 8], false)), Ready::new(true));
        assert_eq!(result, Err(WidthError::MalformedFraming { end: 6, master_width: 4 }));
        assert_eq!(conv.peek(), Some(&beat(&[1, 2, 3, 4], true)));
        assert_eq!(conv.stats().emitted_beats, 0);

        let (fwd, _) = conv.tick(&Valid::invalid(), Ready::new(true)).unwrap();
        assert_eq!(fwd.into_inner(), Some(beat(&[1, 2, 3, 4], true)));
    }

    #[test]
    fn buffer_stays_below_capacity_under_stall() {
        for (slave_width, master_width) in [(2, 4), (1, 8), (4, 4), (8, 2)] {
            let mut conv = WidthConverter::new(WidthConfig::new(slave_width, master_width, false)).unwrap();
            let input = beat(&vec![0; slave_width], false);
            for _ in 0..32 {
                if let Ok(Accept::WouldBlock(_)) = conv.try_accept(input.clone()) {
                    break;
                }
                assert!(conv.buffered() < conv.capacity());
            }
            assert!(!conv.is_ready());
            assert!(conv.buffered() < conv.capacity());
        }
    }
}
