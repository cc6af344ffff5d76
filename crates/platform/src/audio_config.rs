//! Audio streaming configuration for the USB-to-I2S playback path.
//!
//! Packet and buffer sizes follow from the USB full-speed frame period:
//! the host sends one isochronous OUT packet per 1 ms frame, carrying
//! `sample_rate / 1000` sample frames on average.
//!
//! # Sizing
//!
//! ```text
//! packet_size          = channels × (rate_hz / 1000) × sample_bytes
//! nominal_buffer_size  = AUDIO_BUFFER_PACKET_COUNT × packet_size
//! physical capacity    = AUDIO_MAX_BUFFER_SIZE + AUDIO_MAX_PACKET_SIZE
//! ```
//!
//! For 48 kHz / 16 bit / stereo: 192 bytes per packet, 1536 bytes nominal.
//!
//! The maximum packet holds one sample frame more than the nominal packet at
//! the highest rate, because an asynchronous sink lets the host stretch a
//! packet by one frame to follow the feedback value.

use crate::audio_types::{ChannelCount, SampleRateHz, SampleWidth};

/// Number of interleaved channels on the playback interface.
pub const AUDIO_CHANNEL_COUNT: ChannelCount = ChannelCount::STEREO;

/// Sample width the interface is built for.
pub const AUDIO_SAMPLE_WIDTH: SampleWidth = SampleWidth::Bits16;

/// Capacity of the playback buffer, counted in nominal packets.
pub const AUDIO_BUFFER_PACKET_COUNT: usize = 8;

/// USB full-speed frames per second (one isochronous packet each).
pub const USB_FRAMES_PER_SECOND: u32 = 1_000;

/// Largest transaction the isochronous OUT endpoint accepts, in bytes.
///
/// 2 channels × (96 + 1) sample frames × 4 bytes = 776 bytes.
pub const AUDIO_MAX_PACKET_SIZE: usize = max_packet_size(
    AUDIO_CHANNEL_COUNT.get() as usize,
    SampleRateHz::MAX_HZ,
    SampleWidth::Bits32,
);

/// Largest nominal buffer size any supported format can request.
pub const AUDIO_MAX_BUFFER_SIZE: usize = buffer_size(
    AUDIO_BUFFER_PACKET_COUNT,
    packet_size(
        AUDIO_CHANNEL_COUNT.get() as usize,
        SampleRateHz::MAX_HZ,
        SampleWidth::Bits32,
    ),
);

/// Physical size of the playback buffer: nominal region plus overflow tail.
pub const PLAYBACK_BUFFER_CAPACITY: usize = AUDIO_MAX_BUFFER_SIZE + AUDIO_MAX_PACKET_SIZE;

/// Nominal packet size in bytes for one USB frame.
#[must_use]
#[allow(clippy::arithmetic_side_effects)] // Safety: rate ≤ u32::MAX / 1000 frames; channels and width ≤ 8 × 4
pub const fn packet_size(channels: usize, rate_hz: u32, width: SampleWidth) -> usize {
    channels * (rate_hz / USB_FRAMES_PER_SECOND) as usize * width.bytes()
}

/// Largest packet size for a format: one sample frame above nominal.
#[must_use]
#[allow(clippy::arithmetic_side_effects)] // Safety: see packet_size; +1 frame cannot overflow usize
pub const fn max_packet_size(channels: usize, rate_hz: u32, width: SampleWidth) -> usize {
    channels * ((rate_hz / USB_FRAMES_PER_SECOND) as usize + 1) * width.bytes()
}

/// Nominal buffer size in bytes for `packet_count` packets.
#[must_use]
#[allow(clippy::arithmetic_side_effects)] // Safety: both operands are small compile-time bounds
pub const fn buffer_size(packet_count: usize, packet_size: usize) -> usize {
    packet_count * packet_size
}
