//! Sample word fix-up for the I2S TX DMA.
//!
//! The DMA moves half-words. A 32-bit sample is therefore sent as two 16-bit
//! transfers, lower address first, which puts the low half on the wire
//! before the high half. Swapping the halves in memory right after a packet
//! lands makes the DMA emit them in the right order.

use platform::audio_types::SampleWidth;

/// Word-order strategy, resolved once from the configured sample width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleWordCorrector {
    /// Samples already match the transfer unit; nothing to do.
    #[default]
    Passthrough,
    /// Swap the two 16-bit halves of every 32-bit word.
    SwapHalfWords,
}

impl SampleWordCorrector {
    /// Pick the strategy for `width`.
    #[must_use]
    pub const fn for_width(width: SampleWidth) -> Self {
        if width.exceeds_transfer_unit() {
            Self::SwapHalfWords
        } else {
            Self::Passthrough
        }
    }

    /// Fix the sample words in a freshly written region, in place.
    ///
    /// `bytes` must hold whole samples. A trailing partial word is left
    /// untouched.
    pub fn apply(self, bytes: &mut [u8]) {
        match self {
            Self::Passthrough => {}
            Self::SwapHalfWords => {
                for word in bytes.chunks_exact_mut(4) {
                    word.rotate_left(2);
                }
            }
        }
    }
}
