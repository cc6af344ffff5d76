//! One USB audio playback path: buffer, fill tracking, mode flags.
//!
//! [`UsbPlayback`] is the single owned instance of the playback core. It is
//! constructed once, reset at every streaming-session boundary, and never
//! destroyed. Every operation is synchronous and bounded; nothing here
//! waits. Callers that share it between interrupt handlers go through
//! [`SharedPlayback`](crate::SharedPlayback), which holds a critical section
//! across each whole operation.

use platform::{audio_types::SampleRateHz, TxSnapshot, TxStream, UsbAudioEndpoint};

use crate::{
    circular_buffer::CircularAudioBuffer,
    config::{AudioFormat, ConfigError},
    fill_level::FillLevelTracker,
    notification::{Notification, NotificationChannel},
    state::{PlaybackState, PlaybackStateMachine},
};

/// The playback core for one audio path.
///
/// `N` is the physical buffer capacity in bytes, `Q` the notification
/// channel depth.
pub struct UsbPlayback<'a, const N: usize, const Q: usize> {
    buffer: CircularAudioBuffer<N>,
    fill: FillLevelTracker,
    state: PlaybackStateMachine,
    format: AudioFormat,
    format_pending: bool,
    notifications: &'a NotificationChannel<Q>,
}

impl<'a, const N: usize, const Q: usize> UsbPlayback<'a, N, Q> {
    /// Idle playback core posting to `notifications`.
    ///
    /// The default format is applied on the first reset.
    pub const fn new(notifications: &'a NotificationChannel<Q>) -> Self {
        Self {
            buffer: CircularAudioBuffer::new(),
            fill: FillLevelTracker::new(),
            state: PlaybackStateMachine::new(),
            format: AudioFormat::DEFAULT,
            format_pending: true,
            notifications,
        }
    }

    // ── Configuration ───────────────────────────────────────────────────────

    /// Select a new sample rate, keeping width, channels and packet count.
    ///
    /// Takes effect at the next reset (see [`set_format`](Self::set_format)).
    pub fn set_sample_rate(&mut self, rate_hz: u32) -> Result<(), ConfigError> {
        let rate = SampleRateHz::new(rate_hz)?;
        self.set_format(self.format.with_sample_rate(rate))
    }

    /// Select a new audio format.
    ///
    /// The format is validated now. While idle it is applied immediately;
    /// while streaming it is held until the next reset (a new streaming
    /// session or a playback release), so an in-progress buffering phase is
    /// never disturbed.
    pub fn set_format(&mut self, format: AudioFormat) -> Result<(), ConfigError> {
        format.buffer_config().validate::<N>()?;
        self.format = format;
        self.format_pending = true;
        if !self.state.is_streaming_enabled() {
            self.reset();
        }
        Ok(())
    }

    /// Format most recently selected (applied or pending).
    pub fn format(&self) -> AudioFormat {
        self.format
    }

    // ── Session control ─────────────────────────────────────────────────────

    /// Begin a streaming session: Idle → Buffering.
    ///
    /// Resets offsets and fill level, applies any pending format, sends an
    /// empty feedback packet ("not known yet") and arms the first reception.
    /// A no-op while already streaming, whether buffering or playing.
    pub fn start_streaming<U: UsbAudioEndpoint>(&mut self, usb: &mut U) {
        if self.state.is_streaming_enabled() {
            return;
        }

        self.reset();
        if !self.buffer.is_configured() {
            #[cfg(feature = "defmt")]
            defmt::error!("streaming refused: no valid buffer format");
            #[cfg(feature = "std")]
            tracing::error!("streaming refused: no valid buffer format");
            return;
        }

        self.state.start_streaming();
        #[cfg(feature = "defmt")]
        defmt::info!(
            "streaming started: {} Hz, buffer {} bytes, target {}",
            self.format.sample_rate.get(),
            self.buffer.nominal_size(),
            self.fill.target_fill_size()
        );
        #[cfg(feature = "std")]
        tracing::info!(
            rate_hz = self.format.sample_rate.get(),
            buffer = self.buffer.nominal_size(),
            target = self.fill.target_fill_size(),
            "streaming started"
        );

        usb.transmit_feedback(&[]);
        usb.start_receive(self.buffer.receive_region_mut());
    }

    /// End the streaming session: Buffering | Playing → Idle.
    ///
    /// Releases playback first if it was active. A no-op while idle.
    pub fn stop_streaming(&mut self) {
        if !self.state.is_streaming_enabled() {
            return;
        }

        self.release_playback();
        self.state.stop_streaming();
        #[cfg(feature = "defmt")]
        defmt::info!("streaming stopped");
        #[cfg(feature = "std")]
        tracing::info!("streaming stopped");
    }

    /// Handle completion of one isochronous OUT transaction.
    ///
    /// A zero `transaction_size` is a failed transfer and ends the session.
    /// Otherwise the bytes already sitting in the receive region are
    /// committed, the read offset is re-derived from `tx`, and playback
    /// latches once the fill level reaches the target. Reception is then
    /// re-armed at the new write offset.
    ///
    /// Ignored while not streaming.
    ///
    /// # Panics
    ///
    /// Panics if the transaction is larger than the maximum packet size
    /// (see [`CircularAudioBuffer::write`]).
    pub fn on_packet_received<U, T>(&mut self, transaction_size: usize, usb: &mut U, tx: &T)
    where
        U: UsbAudioEndpoint,
        T: TxStream + ?Sized,
    {
        if !self.state.is_streaming_enabled() {
            return;
        }

        if transaction_size == 0 {
            #[cfg(feature = "defmt")]
            defmt::warn!("audio transaction failed, ending session");
            #[cfg(feature = "std")]
            tracing::warn!("audio transaction failed, ending session");
            self.release_playback();
            self.stop_streaming();
            return;
        }

        self.buffer.write(transaction_size);
        let fill = self.fill.update(
            self.buffer.write_offset(),
            self.buffer.nominal_size(),
            self.buffer.sample_width(),
            TxSnapshot::capture(tx),
        );

        if self
            .state
            .try_latch_playback(fill, self.fill.target_fill_size())
        {
            #[cfg(feature = "defmt")]
            defmt::info!(
                "playback started: fill {} / target {}",
                fill,
                self.fill.target_fill_size()
            );
            #[cfg(feature = "std")]
            tracing::info!(
                fill,
                target = self.fill.target_fill_size(),
                "playback started"
            );
            self.notifications.post(Notification::BeginOutput);
        }

        usb.start_receive(self.buffer.receive_region_mut());
    }

    /// Region the next transaction lands in.
    ///
    /// Drivers that copy rather than DMA write the packet here before
    /// calling [`on_packet_received`](Self::on_packet_received).
    pub fn receive_region_mut(&mut self) -> &mut [u8] {
        self.buffer.receive_region_mut()
    }

    // ── Internals ───────────────────────────────────────────────────────────

    /// Playing → Buffering: reset for the next buffering phase and post
    /// `EndOutput`. A no-op if playback is not active.
    fn release_playback(&mut self) {
        if !self.state.release_playback() {
            return;
        }
        self.reset();
        #[cfg(feature = "defmt")]
        defmt::info!("playback released");
        #[cfg(feature = "std")]
        tracing::info!("playback released");
        self.notifications.post(Notification::EndOutput);
    }

    /// Zero offsets and fill level, applying a pending format first.
    fn reset(&mut self) {
        if self.format_pending {
            match self.buffer.configure(self.format.buffer_config()) {
                Ok(()) => {
                    self.fill
                        .configure(self.buffer.nominal_size(), self.buffer.packet_size());
                    self.format_pending = false;
                }
                Err(_e) => {
                    #[cfg(feature = "defmt")]
                    defmt::error!("format rejected: {}", _e);
                    #[cfg(feature = "std")]
                    tracing::error!(error = %_e, "format rejected");
                }
            }
        }
        self.buffer.reset();
        self.fill.reset();
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    /// Nominal packet size in bytes.
    pub fn packet_size(&self) -> usize {
        self.buffer.packet_size()
    }

    /// Nominal buffer size in bytes.
    pub fn buffer_size(&self) -> usize {
        self.buffer.nominal_size()
    }

    /// Fill size computed at the last packet.
    pub fn fill_size(&self) -> usize {
        self.fill.fill_size()
    }

    /// Fill level at which playback starts.
    pub fn target_fill_size(&self) -> usize {
        self.fill.target_fill_size()
    }

    /// Producer offset.
    pub fn write_offset(&self) -> usize {
        self.buffer.write_offset()
    }

    /// Consumer offset derived at the last packet.
    pub fn read_offset(&self) -> usize {
        self.fill.read_offset()
    }

    /// Current state.
    pub fn state(&self) -> PlaybackState {
        self.state.state()
    }

    /// USB side is receiving.
    pub fn is_streaming_enabled(&self) -> bool {
        self.state.is_streaming_enabled()
    }

    /// I2S side is consuming.
    pub fn is_playback_enabled(&self) -> bool {
        self.state.is_playback_enabled()
    }

    /// Base address of the playback buffer.
    pub fn buffer_ptr(&self) -> *const u8 {
        self.buffer.as_ptr()
    }

    /// The nominal buffer region.
    pub fn buffer(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    /// Notifications dropped on a full channel.
    pub fn dropped_notifications(&self) -> u32 {
        self.notifications.dropped_count()
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
    use platform::mocks::{MockTxStream, MockUsbEndpoint};

    const CAP: usize = platform::audio_config::PLAYBACK_BUFFER_CAPACITY;

    #[test]
    fn first_reset_applies_default_format() {
        let ch: NotificationChannel = NotificationChannel::new();
        let mut pb = UsbPlayback::<CAP, 4>::new(&ch);
        let mut usb = MockUsbEndpoint::new();

        pb.start_streaming(&mut usb);

        assert_eq!(pb.packet_size(), 192);
        assert_eq!(pb.buffer_size(), 1536);
        assert_eq!(pb.target_fill_size(), 864);
        assert_eq!(pb.state(), PlaybackState::Buffering);
    }

    #[test]
    fn start_streaming_sends_empty_feedback_and_arms_at_zero() {
        let ch: NotificationChannel = NotificationChannel::new();
        let mut pb = UsbPlayback::<CAP, 4>::new(&ch);
        let mut usb = MockUsbEndpoint::new();

        pb.start_streaming(&mut usb);

        assert_eq!(usb.feedback_count(), 1);
        assert_eq!(usb.last_feedback_len(), Some(0));
        let region = usb.last_armed().unwrap();
        assert_eq!(region.offset_from(pb.buffer_ptr()), Some(0));
        assert_eq!(region.len, 776);
    }

    #[test]
    fn streaming_refused_when_default_format_does_not_fit() {
        let ch: NotificationChannel = NotificationChannel::new();
        let mut pb = UsbPlayback::<512, 4>::new(&ch);
        let mut usb = MockUsbEndpoint::new();

        pb.start_streaming(&mut usb);

        assert_eq!(pb.state(), PlaybackState::Idle);
        assert_eq!(usb.arm_count(), 0);
        assert_eq!(usb.feedback_count(), 0);
    }

    #[test]
    fn packet_rearms_at_new_write_offset() {
        let ch: NotificationChannel = NotificationChannel::new();
        let mut pb = UsbPlayback::<CAP, 4>::new(&ch);
        let mut usb = MockUsbEndpoint::new();
        let tx = MockTxStream::new();

        pb.start_streaming(&mut usb);
        pb.on_packet_received(192, &mut usb, &tx);

        assert_eq!(pb.write_offset(), 192);
        let region = usb.last_armed().unwrap();
        assert_eq!(region.offset_from(pb.buffer_ptr()), Some(192));
        assert_eq!(usb.arm_count(), 2);
    }

    #[test]
    fn packets_while_idle_are_ignored() {
        let ch: NotificationChannel = NotificationChannel::new();
        let mut pb = UsbPlayback::<CAP, 4>::new(&ch);
        let mut usb = MockUsbEndpoint::new();
        let tx = MockTxStream::new();

        pb.on_packet_received(192, &mut usb, &tx);

        assert_eq!(pb.write_offset(), 0);
        assert_eq!(usb.arm_count(), 0);
    }

    #[test]
    fn active_stream_sets_read_offset() {
        let ch: NotificationChannel = NotificationChannel::new();
        let mut pb = UsbPlayback::<CAP, 4>::new(&ch);
        let mut usb = MockUsbEndpoint::new();

        pb.start_streaming(&mut usb);
        for _ in 0..5 {
            pb.on_packet_received(192, &mut usb, &MockTxStream::new());
        }
        assert!(pb.is_playback_enabled());

        // DMA is a quarter of the way through its pass.
        pb.on_packet_received(192, &mut usb, &MockTxStream::active(576));
        assert_eq!(pb.read_offset(), 384);
        assert_eq!(pb.fill_size(), 1152 - 384);
    }

    #[test]
    fn sample_rate_change_while_streaming_waits_for_reset() {
        let ch: NotificationChannel = NotificationChannel::new();
        let mut pb = UsbPlayback::<CAP, 4>::new(&ch);
        let mut usb = MockUsbEndpoint::new();

        pb.start_streaming(&mut usb);
        pb.set_sample_rate(44_100).unwrap();
        assert_eq!(pb.packet_size(), 192, "pending until reset");

        pb.stop_streaming();
        pb.start_streaming(&mut usb);
        assert_eq!(pb.packet_size(), 176);
        assert_eq!(pb.buffer_size(), 1408);
        assert_eq!(pb.target_fill_size(), 792);
    }

    #[test]
    fn sample_rate_change_while_idle_applies_now() {
        let ch: NotificationChannel = NotificationChannel::new();
        let mut pb = UsbPlayback::<CAP, 4>::new(&ch);

        pb.set_sample_rate(96_000).unwrap();

        assert_eq!(pb.packet_size(), 384);
        assert_eq!(pb.format().sample_rate.get(), 96_000);
    }

    #[test]
    fn unsupported_sample_rate_is_rejected() {
        let ch: NotificationChannel = NotificationChannel::new();
        let mut pb = UsbPlayback::<CAP, 4>::new(&ch);

        let err = pb.set_sample_rate(192_000).unwrap_err();

        assert!(matches!(err, ConfigError::SampleRate(_)));
        assert_eq!(pb.format(), AudioFormat::DEFAULT);
    }

    #[test]
    fn receive_region_follows_write_offset() {
        let ch: NotificationChannel = NotificationChannel::new();
        let mut pb = UsbPlayback::<CAP, 4>::new(&ch);
        let mut usb = MockUsbEndpoint::new();
        let tx = MockTxStream::new();

        pb.start_streaming(&mut usb);
        pb.receive_region_mut()[..4].copy_from_slice(&[1, 2, 3, 4]);
        pb.on_packet_received(4, &mut usb, &tx);

        assert_eq!(&pb.buffer()[..4], &[1, 2, 3, 4]);
        assert_eq!(pb.receive_region_mut().len(), 776);
    }
}
