//! Property-based tests for the circular buffer and fill-level math.
//! Verifies invariants hold for ALL valid inputs, not just fixed examples.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation
)]

use platform::{
    audio_config::PLAYBACK_BUFFER_CAPACITY,
    audio_types::SampleWidth,
    mocks::{MockTxStream, MockUsbEndpoint},
    TxSnapshot,
};
use playback::{
    fill_level::{fill_size, read_offset, target_fill_size},
    BufferConfig, CircularAudioBuffer, NotificationChannel, SampleWordCorrector, UsbPlayback,
};
use proptest::prelude::*;

const NOMINAL: usize = 1536;
const MAX_PACKET: usize = 776;
const CAP: usize = NOMINAL + MAX_PACKET;

fn buffer(width: SampleWidth) -> CircularAudioBuffer<CAP> {
    let mut buf = CircularAudioBuffer::new();
    buf.configure(BufferConfig {
        packet_size: 192,
        packet_count: 8,
        max_packet_size: MAX_PACKET,
        sample_width: width,
    })
    .unwrap();
    buf
}

/// Write `sizes` through the buffer and check every byte against a plain
/// modulo-indexed model of the ring.
fn check_wrap(width: SampleWidth, sizes: &[usize]) -> Result<(), TestCaseError> {
    let mut buf = buffer(width);
    let corrector = SampleWordCorrector::for_width(width);
    let mut model = vec![0u8; NOMINAL];
    let mut offset = 0usize;
    let mut seq = 0u8;

    for &size in sizes {
        let data: Vec<u8> = (0..size)
            .map(|_| {
                seq = seq.wrapping_add(1);
                seq
            })
            .collect();

        prop_assert!(buf.write_offset() + size < CAP);
        buf.receive_region_mut()[..size].copy_from_slice(&data);
        buf.write(size);

        let mut expected = data.clone();
        corrector.apply(&mut expected);
        for (i, b) in expected.iter().enumerate() {
            model[(offset + i) % NOMINAL] = *b;
        }
        offset = (offset + size) % NOMINAL;

        prop_assert_eq!(buf.write_offset(), offset);
        prop_assert_eq!(buf.as_slice(), model.as_slice());
    }
    Ok(())
}

proptest! {
    /// Logical ring contents match the bytes written, across any wrap.
    #[test]
    fn wrap_preserves_bytes_16bit(sizes in prop::collection::vec(1usize..=MAX_PACKET, 1..24)) {
        check_wrap(SampleWidth::Bits16, &sizes)?;
    }

    /// Same with 32-bit words, which are half-word swapped before wrapping.
    #[test]
    fn wrap_preserves_words_32bit(words in prop::collection::vec(1usize..=MAX_PACKET / 4, 1..24)) {
        let sizes: Vec<usize> = words.iter().map(|w| w * 4).collect();
        check_wrap(SampleWidth::Bits32, &sizes)?;
    }

    /// Fill size is always in [0, nominal) for offsets inside the buffer.
    #[test]
    fn fill_size_is_bounded(write in 0usize..NOMINAL, read in 0usize..NOMINAL) {
        let fill = fill_size(write, read, NOMINAL);
        prop_assert!(fill < NOMINAL);
        prop_assert_eq!((read + fill) % NOMINAL, write);
    }

    /// The derived read offset stays inside the nominal region.
    #[test]
    fn read_offset_is_bounded(
        remaining in 0usize..=4 * NOMINAL,
        active in proptest::bool::ANY,
        wide in proptest::bool::ANY
    ) {
        let width = if wide { SampleWidth::Bits32 } else { SampleWidth::Bits16 };
        let tx = TxSnapshot { remaining_transfers: remaining, active };
        prop_assert!(read_offset(NOMINAL, width, tx) < NOMINAL);
    }

    /// Target is half the buffer plus half a packet, and always reachable.
    #[test]
    fn target_fill_formula(packet in 1usize..=MAX_PACKET, count in 2usize..=16) {
        let nominal = packet * count;
        let target = target_fill_size(nominal, packet);
        prop_assert_eq!(target, nominal / 2 + packet / 2);
        prop_assert!(target < nominal);
    }

    /// Once playing, the session stays playing whatever the fill level does.
    #[test]
    fn playback_latch_holds(
        steps in prop::collection::vec((1usize..=MAX_PACKET, 0usize..=NOMINAL / 2, proptest::bool::ANY), 1..64)
    ) {
        let ch: NotificationChannel = NotificationChannel::new();
        let mut pb = UsbPlayback::<PLAYBACK_BUFFER_CAPACITY, 4>::new(&ch);
        let mut usb = MockUsbEndpoint::new();
        pb.start_streaming(&mut usb);

        let mut latched = false;
        for (size, remaining, active) in steps {
            let mut tx = MockTxStream::new();
            tx.set_remaining(remaining);
            tx.set_active(active);
            pb.on_packet_received(size, &mut usb, &tx);

            prop_assert!(pb.fill_size() < pb.buffer_size());
            if latched {
                prop_assert!(pb.is_playback_enabled());
            }
            latched = pb.is_playback_enabled();
        }
        prop_assert_eq!(pb.dropped_notifications(), 0);
    }
}
