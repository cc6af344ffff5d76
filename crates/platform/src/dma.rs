//! DMA abstraction layer
//!
//! The playback core never tracks the I2S read position itself. It asks the
//! TX DMA stream how far the current circular pass has progressed and derives
//! the read offset from that snapshot.

/// Status of the I2S transmit DMA stream.
///
/// Implementations read the stream's number-of-data register (NDTR on
/// STM32) and the I2S driver state. Both calls must be callable from
/// interrupt context and must not block.
pub trait TxStream {
    /// Number of half-word transfers left before the current circular pass
    /// wraps back to the buffer start.
    ///
    /// The count is in DMA transfer units (16 bit), not samples: a 32-bit
    /// sample takes two units.
    fn remaining_transfers(&self) -> usize;

    /// `true` while the I2S peripheral is actively transmitting.
    fn is_active(&self) -> bool;
}

impl<T: TxStream + ?Sized> TxStream for &T {
    fn remaining_transfers(&self) -> usize {
        (**self).remaining_transfers()
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }
}

/// Snapshot of a [`TxStream`] taken at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxSnapshot {
    /// Half-word transfers left in the current pass.
    pub remaining_transfers: usize,
    /// Whether the stream was running.
    pub active: bool,
}

impl TxSnapshot {
    /// Read both values from `stream`.
    pub fn capture<S: TxStream + ?Sized>(stream: &S) -> Self {
        Self {
            remaining_transfers: stream.remaining_transfers(),
            active: stream.is_active(),
        }
    }
}
