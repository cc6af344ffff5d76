//! Playback buffer configuration.
//!
//! [`AudioFormat`] is what the USB host selects (sample rate, plus the
//! interface's fixed width and channel count). [`BufferConfig`] is the byte
//! geometry the circular buffer derives from it. Both are validated against
//! the physical buffer capacity before they can reach the offset arithmetic.

use platform::audio_config::{
    self, AUDIO_BUFFER_PACKET_COUNT, AUDIO_CHANNEL_COUNT, AUDIO_MAX_PACKET_SIZE,
    AUDIO_SAMPLE_WIDTH,
};
use platform::audio_types::{ChannelCount, OutOfRangeError, SampleRateHz, SampleWidth};

/// Errors rejected at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The nominal packet size is zero.
    #[error("packet size must be non-zero")]
    ZeroPacketSize,
    /// The buffer holds zero packets.
    #[error("buffer must hold at least one packet")]
    ZeroPacketCount,
    /// Nominal buffer plus overflow tail does not fit the physical storage.
    #[error("buffer needs {required} bytes but only {capacity} are available")]
    BufferTooSmall {
        /// Bytes the configuration needs (nominal size + max packet size).
        required: usize,
        /// Physical capacity of the storage.
        capacity: usize,
    },
    /// The nominal packet is larger than the largest acceptable transaction.
    #[error("packet size {packet_size} exceeds max packet size {max_packet_size}")]
    PacketTooLarge {
        /// Nominal packet size.
        packet_size: usize,
        /// Largest transaction the endpoint accepts.
        max_packet_size: usize,
    },
    /// A single transaction could wrap past the buffer start more than once.
    #[error("nominal buffer of {buffer_size} bytes is shorter than one max packet ({max_packet_size})")]
    BufferShorterThanPacket {
        /// Nominal buffer size.
        buffer_size: usize,
        /// Largest transaction the endpoint accepts.
        max_packet_size: usize,
    },
    /// The requested sample rate is not advertised by the interface.
    #[error("unsupported sample rate: {} Hz", .0.value)]
    SampleRate(OutOfRangeError),
}

impl From<OutOfRangeError> for ConfigError {
    fn from(err: OutOfRangeError) -> Self {
        Self::SampleRate(err)
    }
}

/// Byte geometry of the circular playback buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BufferConfig {
    /// Nominal packet size in bytes (one USB frame of audio).
    pub packet_size: usize,
    /// Nominal buffer length, counted in packets.
    pub packet_count: usize,
    /// Largest transaction the endpoint may deliver, and the overflow tail length.
    pub max_packet_size: usize,
    /// Sample word width, selecting the word fix-up strategy.
    pub sample_width: SampleWidth,
}

impl BufferConfig {
    /// Nominal buffer size in bytes, `None` on overflow.
    #[must_use]
    pub const fn nominal_size(&self) -> Option<usize> {
        self.packet_size.checked_mul(self.packet_count)
    }

    /// Check this geometry against a physical storage of `N` bytes.
    ///
    /// Returns the nominal buffer size on success.
    pub fn validate<const N: usize>(&self) -> Result<usize, ConfigError> {
        if self.packet_size == 0 {
            return Err(ConfigError::ZeroPacketSize);
        }
        if self.packet_count == 0 {
            return Err(ConfigError::ZeroPacketCount);
        }
        if self.packet_size > self.max_packet_size {
            return Err(ConfigError::PacketTooLarge {
                packet_size: self.packet_size,
                max_packet_size: self.max_packet_size,
            });
        }

        let nominal = self.nominal_size().ok_or(ConfigError::BufferTooSmall {
            required: usize::MAX,
            capacity: N,
        })?;
        if nominal < self.max_packet_size {
            return Err(ConfigError::BufferShorterThanPacket {
                buffer_size: nominal,
                max_packet_size: self.max_packet_size,
            });
        }

        let required = nominal.saturating_add(self.max_packet_size);
        if required > N {
            return Err(ConfigError::BufferTooSmall {
                required,
                capacity: N,
            });
        }
        Ok(nominal)
    }
}

/// Audio stream format negotiated with the USB host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AudioFormat {
    /// Sample rate selected by the host.
    pub sample_rate: SampleRateHz,
    /// Sample word width.
    pub sample_width: SampleWidth,
    /// Interleaved channel count.
    pub channels: ChannelCount,
    /// Buffer length in nominal packets.
    pub packet_count: usize,
}

impl AudioFormat {
    /// 48 kHz, 16 bit, stereo, eight packets of buffering.
    pub const DEFAULT: Self = Self {
        sample_rate: SampleRateHz::DEFAULT,
        sample_width: AUDIO_SAMPLE_WIDTH,
        channels: AUDIO_CHANNEL_COUNT,
        packet_count: AUDIO_BUFFER_PACKET_COUNT,
    };

    /// Same format at another sample rate.
    #[must_use]
    pub const fn with_sample_rate(self, sample_rate: SampleRateHz) -> Self {
        Self {
            sample_rate,
            ..self
        }
    }

    /// Nominal packet size for this format.
    #[must_use]
    pub const fn packet_size(&self) -> usize {
        audio_config::packet_size(
            self.channels.get() as usize,
            self.sample_rate.get(),
            self.sample_width,
        )
    }

    /// Buffer geometry for this format.
    ///
    /// Reception is always armed with the endpoint's maximum packet size,
    /// whatever the current rate, so that is also the overflow tail length.
    #[must_use]
    pub const fn buffer_config(&self) -> BufferConfig {
        BufferConfig {
            packet_size: self.packet_size(),
            packet_count: self.packet_count,
            max_packet_size: AUDIO_MAX_PACKET_SIZE,
            sample_width: self.sample_width,
        }
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self::DEFAULT
    }
}
