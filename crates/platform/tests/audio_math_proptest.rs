//! Property-based tests for audio format math.
//! Verifies invariants hold for ALL valid inputs, not just fixed examples.

#![allow(clippy::arithmetic_side_effects, clippy::indexing_slicing)]

use platform::audio_config::{
    buffer_size, max_packet_size, packet_size, AUDIO_BUFFER_PACKET_COUNT, AUDIO_MAX_PACKET_SIZE,
    PLAYBACK_BUFFER_CAPACITY,
};
use platform::audio_types::{SampleRateHz, SampleWidth};

fn width(wide: bool) -> SampleWidth {
    if wide {
        SampleWidth::Bits32
    } else {
        SampleWidth::Bits16
    }
}

proptest::proptest! {
    /// SampleRateHz::new never panics for any u32 input.
    #[test]
    fn sample_rate_hz_new_never_panics(hz in 0u32..=u32::MAX) {
        // May return Err but must not panic
        let _ = SampleRateHz::new(hz);
    }

    /// Only advertised rates are accepted.
    #[test]
    fn sample_rate_hz_accepts_only_supported(hz in 0u32..=200_000u32) {
        assert_eq!(
            SampleRateHz::new(hz).is_ok(),
            SampleRateHz::SUPPORTED.contains(&hz),
            "SampleRateHz::new({}) acceptance must match the supported list", hz
        );
    }

    /// Every packet holds a whole number of samples.
    #[test]
    fn packet_size_is_whole_samples(idx in 0usize..5, wide in proptest::bool::ANY, channels in 1usize..=8) {
        let hz = SampleRateHz::SUPPORTED[idx];
        let w = width(wide);
        let p = packet_size(channels, hz, w);
        assert_eq!(p % w.bytes(), 0);
        assert_eq!(p % (channels * w.bytes()), 0);
    }

    /// The maximum packet is exactly one sample frame above nominal.
    #[test]
    fn max_packet_is_one_frame_larger(idx in 0usize..5, wide in proptest::bool::ANY, channels in 1usize..=8) {
        let hz = SampleRateHz::SUPPORTED[idx];
        let w = width(wide);
        assert_eq!(
            max_packet_size(channels, hz, w),
            packet_size(channels, hz, w) + channels * w.bytes()
        );
    }

    /// Stereo formats always fit the statically sized playback buffer.
    #[test]
    fn stereo_formats_fit_capacity(idx in 0usize..5, wide in proptest::bool::ANY) {
        let hz = SampleRateHz::SUPPORTED[idx];
        let w = width(wide);
        let nominal = buffer_size(AUDIO_BUFFER_PACKET_COUNT, packet_size(2, hz, w));
        let max_packet = max_packet_size(2, hz, w);
        assert!(max_packet <= AUDIO_MAX_PACKET_SIZE);
        assert!(nominal + max_packet <= PLAYBACK_BUFFER_CAPACITY);
    }
}
