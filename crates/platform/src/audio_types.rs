//! Audio domain newtypes for compile-time safety.
//!
//! These zero-cost abstractions prevent common errors:
//! - `SampleRateHz`: only rates the USB audio interface advertises
//! - `SampleWidth`: sample word width and its DMA transfer granularity
//! - `ChannelCount`: non-zero channel count

// ── Error type ───────────────────────────────────────────────────────────────

/// Error returned when a value is out of the valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutOfRangeError {
    /// The value that was out of range.
    pub value: u32,
    /// The inclusive minimum allowed value.
    pub min: u32,
    /// The inclusive maximum allowed value.
    pub max: u32,
}

// ── SampleRateHz ─────────────────────────────────────────────────────────────

/// Sample rate in Hz, restricted to the rates the playback interface supports.
///
/// The USB host selects one of these via the sampling-frequency control;
/// anything else is rejected before it can reach the packet-size math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct SampleRateHz(u32);

impl SampleRateHz {
    /// Every rate the interface advertises, ascending.
    pub const SUPPORTED: [u32; 5] = [32_000, 44_100, 48_000, 88_200, 96_000];

    /// Minimum supported sample rate.
    pub const MIN_HZ: u32 = 32_000;

    /// Maximum supported sample rate.
    pub const MAX_HZ: u32 = 96_000;

    /// 48 kHz, the rate selected before the host sends a sampling-frequency request.
    pub const DEFAULT: Self = Self(48_000);

    /// Create a `SampleRateHz`, returning an error for unsupported rates.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if `hz` is not listed in [`Self::SUPPORTED`].
    pub fn new(hz: u32) -> Result<Self, OutOfRangeError> {
        if Self::SUPPORTED.contains(&hz) {
            Ok(Self(hz))
        } else {
            Err(OutOfRangeError {
                value: hz,
                min: Self::MIN_HZ,
                max: Self::MAX_HZ,
            })
        }
    }

    /// Return the sample rate in Hz.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Default for SampleRateHz {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ── SampleWidth ──────────────────────────────────────────────────────────────

/// Width of one audio sample word as carried over USB and I2S.
///
/// The I2S TX DMA moves half-words (16 bit). A 32-bit sample therefore takes
/// two DMA transfers, and the two halves arrive in swapped order unless the
/// sample words are fixed up in memory first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleWidth {
    /// 16-bit samples, one DMA transfer each.
    #[default]
    Bits16,
    /// 32-bit samples, two half-word DMA transfers each.
    Bits32,
}

impl SampleWidth {
    /// Sample size in bytes.
    #[must_use]
    pub const fn bytes(self) -> usize {
        match self {
            Self::Bits16 => 2,
            Self::Bits32 => 4,
        }
    }

    /// Number of half-word DMA transfers needed to move one sample.
    #[must_use]
    pub const fn transfer_units(self) -> usize {
        match self {
            Self::Bits16 => 1,
            Self::Bits32 => 2,
        }
    }

    /// Whether the sample is wider than the DMA transfer unit.
    #[must_use]
    pub const fn exceeds_transfer_unit(self) -> bool {
        self.transfer_units() > 1
    }
}

// ── ChannelCount ─────────────────────────────────────────────────────────────

/// Number of interleaved audio channels, at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct ChannelCount(u8);

impl ChannelCount {
    /// Two channels (left, right).
    pub const STEREO: Self = Self(2);

    /// Create a `ChannelCount`, rejecting zero and more than eight channels.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if `count` is 0 or greater than 8.
    pub fn new(count: u8) -> Result<Self, OutOfRangeError> {
        if count == 0 || count > 8 {
            Err(OutOfRangeError {
                value: u32::from(count),
                min: 1,
                max: 8,
            })
        } else {
            Ok(Self(count))
        }
    }

    /// Return the channel count.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn sample_rate_accepts_supported_rates() {
        for hz in SampleRateHz::SUPPORTED {
            assert_eq!(SampleRateHz::new(hz).unwrap().get(), hz);
        }
    }

    #[test]
    fn sample_rate_rejects_192khz() {
        let err = SampleRateHz::new(192_000).unwrap_err();
        assert_eq!(err.value, 192_000);
        assert_eq!(err.max, SampleRateHz::MAX_HZ);
    }

    #[test]
    fn sample_rate_default_is_48khz() {
        assert_eq!(SampleRateHz::default().get(), 48_000);
    }

    #[test]
    fn sample_width_transfer_units() {
        assert_eq!(SampleWidth::Bits16.transfer_units(), 1);
        assert_eq!(SampleWidth::Bits32.transfer_units(), 2);
        assert!(!SampleWidth::Bits16.exceeds_transfer_unit());
        assert!(SampleWidth::Bits32.exceeds_transfer_unit());
    }

    #[test]
    fn channel_count_bounds() {
        assert!(ChannelCount::new(0).is_err());
        assert!(ChannelCount::new(9).is_err());
        assert_eq!(ChannelCount::new(2).unwrap(), ChannelCount::STEREO);
    }
}
