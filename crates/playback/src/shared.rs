//! Critical-section wrapper around [`UsbPlayback`].
//!
//! The USB OUT completion interrupt and the alternate-setting handler both
//! mutate the same session, so every operation below takes the critical
//! section once and runs the whole offsets → fill → state → notify sequence
//! inside it. The longest hold is a packet completion: one sample-word pass
//! over the packet plus the wrap copy, both bounded by the maximum packet
//! size.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};
use platform::{TxStream, UsbAudioEndpoint};

use crate::{
    config::{AudioFormat, ConfigError},
    notification::NotificationChannel,
    session::UsbPlayback,
    state::PlaybackState,
};

/// Interrupt-safe handle to the playback core, usable as a `static`.
///
/// ```ignore
/// static NOTIFICATIONS: NotificationChannel = NotificationChannel::new();
/// static PLAYBACK: SharedPlayback<'static, PLAYBACK_BUFFER_CAPACITY, 4> =
///     SharedPlayback::new(&NOTIFICATIONS);
/// ```
pub struct SharedPlayback<'a, const N: usize, const Q: usize> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<UsbPlayback<'a, N, Q>>>,
}

impl<'a, const N: usize, const Q: usize> SharedPlayback<'a, N, Q> {
    /// Idle playback core posting to `notifications`.
    pub const fn new(notifications: &'a NotificationChannel<Q>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(UsbPlayback::new(notifications))),
        }
    }

    /// Run `f` on the session inside one critical section.
    ///
    /// Keep `f` short: interrupts are masked for its whole duration.
    pub fn lock<R>(&self, f: impl FnOnce(&mut UsbPlayback<'a, N, Q>) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// See [`UsbPlayback::set_sample_rate`].
    pub fn set_sample_rate(&self, rate_hz: u32) -> Result<(), ConfigError> {
        self.lock(|p| p.set_sample_rate(rate_hz))
    }

    /// See [`UsbPlayback::set_format`].
    pub fn set_format(&self, format: AudioFormat) -> Result<(), ConfigError> {
        self.lock(|p| p.set_format(format))
    }

    /// See [`UsbPlayback::start_streaming`].
    pub fn start_streaming<U: UsbAudioEndpoint>(&self, usb: &mut U) {
        self.lock(|p| p.start_streaming(usb));
    }

    /// See [`UsbPlayback::stop_streaming`].
    pub fn stop_streaming(&self) {
        self.lock(UsbPlayback::stop_streaming);
    }

    /// See [`UsbPlayback::on_packet_received`].
    pub fn on_packet_received<U, T>(&self, transaction_size: usize, usb: &mut U, tx: &T)
    where
        U: UsbAudioEndpoint,
        T: TxStream + ?Sized,
    {
        self.lock(|p| p.on_packet_received(transaction_size, usb, tx));
    }

    /// Copy `data` into the receive region, then complete the transaction.
    ///
    /// For drivers that hand over packet bytes instead of receiving in
    /// place. Bytes beyond the receive region are cut off. Returns the
    /// number of bytes committed.
    pub fn receive_packet<U, T>(&self, data: &[u8], usb: &mut U, tx: &T) -> usize
    where
        U: UsbAudioEndpoint,
        T: TxStream + ?Sized,
    {
        self.lock(|p| {
            if !p.is_streaming_enabled() {
                return 0;
            }
            let region = p.receive_region_mut();
            let len = data.len().min(region.len());
            if let (Some(dst), Some(src)) = (region.get_mut(..len), data.get(..len)) {
                dst.copy_from_slice(src);
            }
            p.on_packet_received(len, usb, tx);
            len
        })
    }

    /// Nominal packet size in bytes.
    pub fn packet_size(&self) -> usize {
        self.lock(|p| p.packet_size())
    }

    /// Nominal buffer size in bytes.
    pub fn buffer_size(&self) -> usize {
        self.lock(|p| p.buffer_size())
    }

    /// Fill size computed at the last packet.
    pub fn fill_size(&self) -> usize {
        self.lock(|p| p.fill_size())
    }

    /// Fill level at which playback starts.
    pub fn target_fill_size(&self) -> usize {
        self.lock(|p| p.target_fill_size())
    }

    /// Producer offset.
    pub fn write_offset(&self) -> usize {
        self.lock(|p| p.write_offset())
    }

    /// Consumer offset derived at the last packet.
    pub fn read_offset(&self) -> usize {
        self.lock(|p| p.read_offset())
    }

    /// Current state.
    pub fn state(&self) -> PlaybackState {
        self.lock(|p| p.state())
    }

    /// USB side is receiving.
    pub fn is_streaming_enabled(&self) -> bool {
        self.lock(|p| p.is_streaming_enabled())
    }

    /// I2S side is consuming.
    pub fn is_playback_enabled(&self) -> bool {
        self.lock(|p| p.is_playback_enabled())
    }

    /// Base address of the playback buffer.
    pub fn buffer_ptr(&self) -> *const u8 {
        self.lock(|p| p.buffer_ptr())
    }

    /// Notifications dropped on a full channel.
    pub fn dropped_notifications(&self) -> u32 {
        self.lock(|p| p.dropped_notifications())
    }
}
