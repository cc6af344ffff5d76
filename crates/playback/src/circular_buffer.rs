//! Circular playback buffer shared by the USB producer and the I2S DMA.
//!
//! # Layout
//!
//! ```text
//! 0                          nominal_size         nominal_size + max_packet
//! ├──────── nominal region ─────────┼──────── overflow tail ────────┤
//! ▲ DMA reads here, circularly      ▲ a packet that straddles the end
//!                                     lands here, then is copied to 0
//! ```
//!
//! USB reception is always armed as one linear region of `max_packet_size`
//! bytes at the write offset. A packet that crosses `nominal_size` spills
//! into the tail. [`CircularAudioBuffer::write`] copies the spill back to the
//! start and wraps the write offset, so the DMA only ever sees the nominal
//! region.
//!
//! The storage is 32-byte aligned so that it can be placed in a
//! cache-line-aligned DMA-capable section.

use platform::{audio_types::SampleWidth, TxSnapshot};

use crate::{
    config::{BufferConfig, ConfigError},
    fill_level,
    sample_word::SampleWordCorrector,
};

#[repr(C, align(32))]
struct AlignedStorage<const N: usize>([u8; N]);

/// Fixed-capacity byte buffer with wrap-around write handling.
///
/// `N` is the physical capacity: the largest nominal size plus one maximum
/// packet. A fresh buffer is unconfigured (nominal size 0) until
/// [`configure`](Self::configure) succeeds.
pub struct CircularAudioBuffer<const N: usize> {
    storage: AlignedStorage<N>,
    config: BufferConfig,
    nominal_size: usize,
    write_offset: usize,
    corrector: SampleWordCorrector,
}

impl<const N: usize> CircularAudioBuffer<N> {
    /// Physical capacity in bytes.
    pub const CAPACITY: usize = N;

    /// Zeroed, unconfigured buffer.
    pub const fn new() -> Self {
        Self {
            storage: AlignedStorage([0u8; N]),
            config: BufferConfig {
                packet_size: 0,
                packet_count: 0,
                max_packet_size: 0,
                sample_width: SampleWidth::Bits16,
            },
            nominal_size: 0,
            write_offset: 0,
            corrector: SampleWordCorrector::Passthrough,
        }
    }

    /// Apply a new geometry and reset the write offset.
    ///
    /// On error the previous configuration is kept unchanged.
    pub fn configure(&mut self, config: BufferConfig) -> Result<(), ConfigError> {
        let nominal_size = config.validate::<N>()?;
        self.config = config;
        self.nominal_size = nominal_size;
        self.corrector = SampleWordCorrector::for_width(config.sample_width);
        self.write_offset = 0;
        Ok(())
    }

    /// Whether a valid geometry has been applied.
    pub fn is_configured(&self) -> bool {
        self.nominal_size != 0
    }

    /// Record a completed transaction of `transaction_size` bytes at the
    /// write offset and advance it.
    ///
    /// The new bytes get their sample words fixed first. Any part that went
    /// past the nominal end is then copied to the buffer start, and the
    /// offset wraps.
    ///
    /// # Panics
    ///
    /// Panics if `transaction_size` exceeds the maximum packet size, or if
    /// `write_offset + transaction_size` reaches `nominal_size +
    /// max_packet_size`. Either means the endpoint delivered more than the
    /// overflow tail can hold, and continuing would leave the write offset
    /// outside the nominal region.
    pub fn write(&mut self, transaction_size: usize) {
        let max_packet_size = self.max_packet_size();
        let limit = self.nominal_size.saturating_add(max_packet_size);
        let end = self.write_offset.saturating_add(transaction_size);
        assert!(
            transaction_size <= max_packet_size && end < limit,
            "transaction of {transaction_size} bytes at offset {} overruns the playback buffer",
            self.write_offset
        );

        if let Some(written) = self.storage.0.get_mut(self.write_offset..end) {
            self.corrector.apply(written);
        }

        if end > self.nominal_size {
            // nominal_size < end < nominal_size + max_packet_size <= N here.
            self.storage.0.copy_within(self.nominal_size..end, 0);
        }

        self.write_offset = if end >= self.nominal_size {
            end.saturating_sub(self.nominal_size)
        } else {
            end
        };
    }

    /// Consumer position in the nominal region for a DMA snapshot.
    ///
    /// See [`fill_level::read_offset`].
    pub fn read_position(&self, tx: TxSnapshot) -> usize {
        fill_level::read_offset(self.nominal_size, self.config.sample_width, tx)
    }

    /// Zero the write offset. Buffer contents are left as they are.
    pub fn reset(&mut self) {
        self.write_offset = 0;
    }

    /// Region the next transaction is received into: `max_packet_size`
    /// bytes starting at the write offset.
    ///
    /// Empty while the buffer is unconfigured.
    pub fn receive_region_mut(&mut self) -> &mut [u8] {
        let end = self.write_offset.saturating_add(self.max_packet_size());
        self.storage.0.get_mut(self.write_offset..end).unwrap_or(&mut [])
    }

    /// The nominal region, as the DMA sees it.
    pub fn as_slice(&self) -> &[u8] {
        self.storage.0.get(..self.nominal_size).unwrap_or(&[])
    }

    /// Start of the storage, for handing to the DMA.
    pub fn as_ptr(&self) -> *const u8 {
        self.storage.0.as_ptr()
    }

    /// Producer offset in `[0, nominal_size)`.
    pub fn write_offset(&self) -> usize {
        self.write_offset
    }

    /// Nominal buffer size in bytes.
    pub fn nominal_size(&self) -> usize {
        self.nominal_size
    }

    /// Nominal packet size in bytes.
    pub fn packet_size(&self) -> usize {
        self.config.packet_size
    }

    /// Largest transaction, and the length of every receive region.
    pub fn max_packet_size(&self) -> usize {
        self.config.max_packet_size
    }

    /// Configured sample width.
    pub fn sample_width(&self) -> SampleWidth {
        self.config.sample_width
    }
}

impl<const N: usize> Default for CircularAudioBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use super::*;

    const CAP: usize = 1536 + 776;

    fn configured(width: SampleWidth) -> CircularAudioBuffer<CAP> {
        let mut buf = CircularAudioBuffer::<CAP>::new();
        buf.configure(BufferConfig {
            packet_size: 192,
            packet_count: 8,
            max_packet_size: 776,
            sample_width: width,
        })
        .unwrap();
        buf
    }

    fn receive(buf: &mut CircularAudioBuffer<CAP>, data: &[u8]) {
        buf.receive_region_mut()[..data.len()].copy_from_slice(data);
        buf.write(data.len());
    }

    #[test]
    fn new_buffer_is_unconfigured() {
        let mut buf = CircularAudioBuffer::<64>::new();
        assert!(!buf.is_configured());
        assert!(buf.receive_region_mut().is_empty());
        assert!(buf.as_slice().is_empty());
    }

    #[test]
    fn storage_is_32_byte_aligned() {
        let buf = configured(SampleWidth::Bits16);
        assert_eq!(buf.as_ptr() as usize % 32, 0);
    }

    #[test]
    fn configure_error_keeps_previous_geometry() {
        let mut buf = configured(SampleWidth::Bits16);
        let err = buf.configure(BufferConfig {
            packet_size: 0,
            packet_count: 8,
            max_packet_size: 776,
            sample_width: SampleWidth::Bits16,
        });
        assert_eq!(err, Err(ConfigError::ZeroPacketSize));
        assert_eq!(buf.nominal_size(), 1536);
    }

    #[test]
    fn receive_region_spans_max_packet_at_write_offset() {
        let mut buf = configured(SampleWidth::Bits16);
        receive(&mut buf, &[0u8; 192]);
        let base = buf.as_ptr() as usize;
        let region = buf.receive_region_mut();
        assert_eq!(region.len(), 776);
        assert_eq!(region.as_ptr() as usize - base, 192);
    }

    #[test]
    fn linear_write_advances_offset() {
        let mut buf = configured(SampleWidth::Bits16);
        receive(&mut buf, &[7u8; 192]);
        assert_eq!(buf.write_offset(), 192);
        assert!(buf.as_slice()[..192].iter().all(|&b| b == 7));
    }

    #[test]
    fn write_ending_exactly_at_nominal_wraps_to_zero() {
        let mut buf = configured(SampleWidth::Bits16);
        for _ in 0..8 {
            receive(&mut buf, &[1u8; 192]);
        }
        assert_eq!(buf.write_offset(), 0);
    }

    #[test]
    fn straddling_write_copies_excess_to_start() {
        let mut buf = configured(SampleWidth::Bits16);
        // Walk to offset 1500.
        for _ in 0..7 {
            receive(&mut buf, &[0u8; 192]);
        }
        receive(&mut buf, &[0u8; 156]);
        assert_eq!(buf.write_offset(), 1500);

        let packet: [u8; 192] = core::array::from_fn(|i| i as u8);
        receive(&mut buf, &packet);

        // 1692 - 1536 = 156 bytes wrapped to the start.
        assert_eq!(buf.write_offset(), 156);
        assert_eq!(&buf.as_slice()[1500..1536], &packet[..36]);
        assert_eq!(&buf.as_slice()[..156], &packet[36..]);
    }

    #[test]
    fn wide_samples_are_fixed_before_wrap_copy() {
        let mut buf = configured(SampleWidth::Bits32);
        for _ in 0..7 {
            receive(&mut buf, &[0u8; 192]);
        }
        receive(&mut buf, &[0u8; 152]);
        assert_eq!(buf.write_offset(), 1496);

        // Two 32-bit words: one before the nominal end, one after.
        let mut packet = [0u8; 80];
        packet[..4].copy_from_slice(&0x1234_5678u32.to_le_bytes());
        packet[40..44].copy_from_slice(&0x9ABC_DEF0u32.to_le_bytes());
        receive(&mut buf, &packet);

        let first = u32::from_le_bytes(buf.as_slice()[1496..1500].try_into().unwrap());
        let wrapped = u32::from_le_bytes(buf.as_slice()[0..4].try_into().unwrap());
        assert_eq!(first, 0x5678_1234);
        assert_eq!(wrapped, 0xDEF0_9ABC);
        assert_eq!(buf.write_offset(), 40);
    }

    #[test]
    #[should_panic(expected = "overruns the playback buffer")]
    fn oversized_transaction_panics() {
        let mut buf = configured(SampleWidth::Bits16);
        for _ in 0..7 {
            receive(&mut buf, &[0u8; 192]);
        }
        // 1344 + 968 = CAP
        buf.write(968);
    }

    #[test]
    fn read_position_follows_dma_progress() {
        let buf = configured(SampleWidth::Bits16);
        let idle = TxSnapshot::default();
        let running = TxSnapshot {
            remaining_transfers: 600,
            active: true,
        };
        assert_eq!(buf.read_position(idle), 0);
        assert_eq!(buf.read_position(running), 336);
    }

    #[test]
    #[should_panic(expected = "overruns the playback buffer")]
    fn transaction_above_max_packet_panics_in_large_storage() {
        // Physical storage far larger than nominal + tail: the limit is
        // still the configured geometry.
        let mut buf = CircularAudioBuffer::<6920>::new();
        buf.configure(BufferConfig {
            packet_size: 192,
            packet_count: 8,
            max_packet_size: 776,
            sample_width: SampleWidth::Bits16,
        })
        .unwrap();
        buf.write(777);
    }

    #[test]
    fn max_packet_at_last_nominal_byte_is_accepted() {
        let mut buf = configured(SampleWidth::Bits16);
        for _ in 0..7 {
            receive(&mut buf, &[0u8; 192]);
        }
        receive(&mut buf, &[0u8; 191]);
        assert_eq!(buf.write_offset(), 1535);

        buf.write(776);
        assert_eq!(buf.write_offset(), 775);
    }

    #[test]
    fn reset_zeroes_write_offset() {
        let mut buf = configured(SampleWidth::Bits16);
        receive(&mut buf, &[0u8; 192]);
        buf.reset();
        assert_eq!(buf.write_offset(), 0);
    }
}
