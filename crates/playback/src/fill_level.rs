//! Fill-level arithmetic.
//!
//! The read offset is never tracked incrementally. Each time a packet lands
//! it is re-derived from the TX DMA's remaining-transfer count, so it cannot
//! drift away from where the hardware actually is.

use platform::{audio_types::SampleWidth, TxSnapshot};

/// Byte offset of the I2S consumer inside the nominal buffer.
///
/// The DMA counts half-word transfers left in the current circular pass.
/// While it runs, the consumer sits that many samples before the end of the
/// nominal region. An inactive stream reads from the start.
#[must_use]
pub fn read_offset(nominal_size: usize, width: SampleWidth, tx: TxSnapshot) -> usize {
    if !tx.active {
        return 0;
    }

    let remaining_samples = tx
        .remaining_transfers
        .checked_div(width.transfer_units())
        .unwrap_or(0);
    let offset = nominal_size.saturating_sub(width.bytes().saturating_mul(remaining_samples));

    // A full pass left means the consumer is at the start.
    if offset == nominal_size {
        0
    } else {
        offset
    }
}

/// Circular forward distance from `read` to `write` in a buffer of `nominal_size`.
///
/// Equal offsets mean an empty buffer. The result is always below
/// `nominal_size` for offsets inside the buffer.
#[must_use]
#[allow(clippy::arithmetic_side_effects)] // Safety: each branch subtracts the smaller operand; read < nominal_size
pub fn fill_size(write: usize, read: usize, nominal_size: usize) -> usize {
    if write >= read {
        write - read
    } else {
        nominal_size - (read - write)
    }
}

/// Fill level at which playback may start: half the buffer plus half a packet.
///
/// Fill is only sampled right after a packet arrives, so it reads half a
/// packet high on average. Adding that half packet keeps the time-averaged
/// level centred on half the buffer.
#[must_use]
pub const fn target_fill_size(nominal_size: usize, packet_size: usize) -> usize {
    (nominal_size / 2).saturating_add(packet_size / 2)
}

/// Last derived read offset and fill size, plus the start threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FillLevelTracker {
    read_offset: usize,
    fill_size: usize,
    target_fill_size: usize,
}

impl FillLevelTracker {
    /// Empty tracker with a zero threshold.
    pub const fn new() -> Self {
        Self {
            read_offset: 0,
            fill_size: 0,
            target_fill_size: 0,
        }
    }

    /// Recompute the threshold for a new buffer geometry.
    pub fn configure(&mut self, nominal_size: usize, packet_size: usize) {
        self.target_fill_size = target_fill_size(nominal_size, packet_size);
    }

    /// Re-derive the read offset from `tx` and recompute the fill size.
    ///
    /// Returns the new fill size.
    pub fn update(
        &mut self,
        write_offset: usize,
        nominal_size: usize,
        width: SampleWidth,
        tx: TxSnapshot,
    ) -> usize {
        self.read_offset = read_offset(nominal_size, width, tx);
        self.fill_size = fill_size(write_offset, self.read_offset, nominal_size);
        self.fill_size
    }

    /// Zero the read offset and fill size. The threshold is kept.
    pub fn reset(&mut self) {
        self.read_offset = 0;
        self.fill_size = 0;
    }

    /// Consumer offset derived at the last update.
    pub fn read_offset(&self) -> usize {
        self.read_offset
    }

    /// Fill size computed at the last update.
    pub fn fill_size(&self) -> usize {
        self.fill_size
    }

    /// Fill level at which playback starts.
    pub fn target_fill_size(&self) -> usize {
        self.target_fill_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active(remaining_transfers: usize) -> TxSnapshot {
        TxSnapshot {
            remaining_transfers,
            active: true,
        }
    }

    #[test]
    fn inactive_stream_reads_from_start() {
        let tx = TxSnapshot {
            remaining_transfers: 100,
            active: false,
        };
        assert_eq!(read_offset(1536, SampleWidth::Bits16, tx), 0);
    }

    #[test]
    fn read_offset_16bit_counts_samples_directly() {
        // 768 half-words = 768 samples = 1536 bytes: start of the pass.
        assert_eq!(read_offset(1536, SampleWidth::Bits16, active(768)), 0);
        assert_eq!(read_offset(1536, SampleWidth::Bits16, active(384)), 768);
        assert_eq!(read_offset(1536, SampleWidth::Bits16, active(1)), 1534);
    }

    #[test]
    fn read_offset_32bit_halves_transfer_count() {
        // 384 half-words = 192 samples × 4 bytes = 768 bytes left.
        assert_eq!(read_offset(3072, SampleWidth::Bits32, active(384)), 2304);
        assert_eq!(read_offset(3072, SampleWidth::Bits32, active(1536)), 0);
    }

    #[test]
    fn read_offset_saturates_on_oversized_count() {
        assert_eq!(read_offset(1536, SampleWidth::Bits16, active(usize::MAX)), 0);
    }

    #[test]
    fn fill_size_forward_and_wrapped() {
        assert_eq!(fill_size(960, 0, 1536), 960);
        assert_eq!(fill_size(100, 1400, 1536), 236);
        assert_eq!(fill_size(500, 500, 1536), 0);
    }

    #[test]
    fn target_fill_is_half_buffer_plus_half_packet() {
        assert_eq!(target_fill_size(1536, 192), 864);
        assert_eq!(target_fill_size(1408, 176), 792);
    }

    #[test]
    fn tracker_update_and_reset() {
        let mut tracker = FillLevelTracker::new();
        tracker.configure(1536, 192);
        assert_eq!(tracker.target_fill_size(), 864);

        let fill = tracker.update(960, 1536, SampleWidth::Bits16, TxSnapshot::default());
        assert_eq!(fill, 960);

        tracker.update(960, 1536, SampleWidth::Bits16, active(384));
        assert_eq!(tracker.read_offset(), 768);
        assert_eq!(tracker.fill_size(), 192);

        tracker.reset();
        assert_eq!(tracker.fill_size(), 0);
        assert_eq!(tracker.read_offset(), 0);
        assert_eq!(tracker.target_fill_size(), 864);
    }
}
