#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use proptest::prelude::*;
    use widthflow::{Beat, WidthConfig};
    use widthflow_std::{Accept, WidthConverter};

    fn widths() -> impl Strategy<Value = (usize, usize)> {
        prop::sample::select(vec![
            (1, 1),
            (1, 2),
            (2, 1),
            (2, 4),
            (4, 2),
            (1, 8),
            (8, 1),
            (4, 16),
            (16, 4),
            (3, 6),
            (6, 3),
            (8, 8),
        ])
    }

    /// Packets of `units * align` bytes each, filled from `pool`, cut into `width`-byte beats.
    fn packets(units: &[usize], align: usize, pool: &[u8]) -> Vec<Vec<u8>> {
        let mut bytes = pool.iter().copied().cycle();
        units.iter().map(|n| bytes.by_ref().take(n * align).collect()).collect()
    }

    fn beats(packets: &[Vec<u8>], width: usize) -> Vec<Beat> {
        packets
            .iter()
            .flat_map(|packet| {
                let n = packet.len() / width;
                packet.chunks(width).enumerate().map(move |(i, chunk)| Beat::new(chunk, i + 1 == n).unwrap())
            })
            .collect()
    }

    /// Feeds `input` through `stages` in series, with the final consumer ready on the cycles given by `ready`.
    fn pump(stages: &mut [WidthConverter], input: Vec<Beat>, ready: &[bool]) -> Vec<Beat> {
        let limit = 16 * (input.len() + 8) * ready.len() * stages.len();
        let mut pending = VecDeque::from(input);
        let mut output = Vec::new();

        for cycle in 0.. {
            if pending.is_empty() && stages.iter().all(WidthConverter::is_idle) {
                break;
            }
            assert!(cycle < limit, "converter chain stalled");

            if ready[cycle % ready.len()] {
                output.extend(stages.last_mut().unwrap().try_emit());
            }

            // Downstream first, so that room opens up along the chain.
            for i in (1..stages.len()).rev() {
                let (head, tail) = stages.split_at_mut(i);
                let (upstream, downstream) = (head.last_mut().unwrap(), &mut tail[0]);
                if downstream.is_ready() {
                    if let Some(beat) = upstream.try_emit() {
                        assert_eq!(downstream.try_accept(beat).unwrap(), Accept::Accepted);
                    }
                }
            }

            if let Some(beat) = pending.pop_front() {
                if let Accept::WouldBlock(beat) = stages[0].try_accept(beat).unwrap() {
                    pending.push_front(beat);
                }
            }
        }
        output
    }

    fn converter(slave_width: usize, master_width: usize, reverse: bool) -> WidthConverter {
        WidthConverter::new(WidthConfig::new(slave_width, master_width, reverse)).unwrap()
    }

    proptest! {
        // Two mirrored converters with the same reverse flag reproduce the input, TLAST included.
        #[test]
        fn prop_round_trip_identity(
            (wa, wb) in widths(),
            reverse in any::<bool>(),
            units in prop::collection::vec(1usize..4, 1..6),
            pool in prop::collection::vec(any::<u8>(), 1..64),
        ) {
            let input = beats(&packets(&units, wa.max(wb), &pool), wa);
            let mut stages = [converter(wa, wb, reverse), converter(wb, wa, reverse)];

            let output = pump(&mut stages, input.clone(), &[true]);
            prop_assert_eq!(output, input);
        }

        // Bytes in equal bytes out, and one TLAST per packet on the beat holding the packet's last byte.
        #[test]
        fn prop_conservation_and_single_last(
            (wa, wb) in widths(),
            units in prop::collection::vec(1usize..4, 1..6),
            pool in prop::collection::vec(any::<u8>(), 1..64),
            ready in prop::collection::vec(any::<bool>(), 1..16),
        ) {
            prop_assume!(ready.iter().any(|r| *r));
            let packets = packets(&units, wa.max(wb), &pool);
            let mut stages = [converter(wa, wb, false)];

            let output = pump(&mut stages, beats(&packets, wa), &ready);

            let stats = stages[0].stats();
            prop_assert_eq!(stats.accepted_bytes, stats.emitted_bytes);
            prop_assert_eq!(stats.packets_in, stats.packets_out);

            let bytes = output.iter().flat_map(|b| b.data().to_vec()).collect::<Vec<_>>();
            prop_assert_eq!(bytes, packets.concat());

            let mut ends = Vec::new();
            let mut offset = 0;
            for beat in &output {
                prop_assert_eq!(beat.width(), wb);
                offset += beat.width();
                if beat.is_last() {
                    ends.push(offset);
                }
            }
            let expected = packets.iter().scan(0, |end, p| { *end += p.len(); Some(*end) }).collect::<Vec<_>>();
            prop_assert_eq!(ends, expected);
        }

        // Reversal flips every beat of the narrower side exactly once.
        #[test]
        fn prop_reverse_flips_narrow_beats(
            (wa, wb) in widths(),
            pool in prop::collection::vec(any::<u8>(), 1..64),
        ) {
            let packets = packets(&[2], wa.max(wb), &pool);
            let plain = pump(&mut [converter(wa, wb, false)], beats(&packets, wa), &[true]);
            let flipped = pump(&mut [converter(wa, wb, true)], beats(&packets, wa), &[true]);

            let narrow = wa.min(wb);
            let flatten = |beats: &[Beat]| beats.iter().flat_map(|b| b.data().to_vec()).collect::<Vec<_>>();
            let expected = flatten(&plain)
                .chunks(narrow)
                .flat_map(|chunk| chunk.iter().rev().copied().collect::<Vec<_>>())
                .collect::<Vec<_>>();
            prop_assert_eq!(flatten(&flipped), expected);
        }
    }
}
