//! Periodic playback status report.
//!
//! Fill level against target is the one number that shows whether the host
//! follows the feedback endpoint: it should hover around half the buffer.

use embassy_time::{Duration, Timer};
use playback::{PlaybackState, SharedPlayback};

/// Default report period.
pub const REPORT_PERIOD: Duration = Duration::from_secs(1);

/// Playback status captured under a single critical section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusReport {
    /// Selected sample rate in Hz.
    pub sample_rate_hz: u32,
    /// Nominal packet size in bytes.
    pub packet_size: usize,
    /// Nominal buffer size in bytes.
    pub buffer_size: usize,
    /// Fill size at the last packet.
    pub fill_size: usize,
    /// Fill level at which playback starts.
    pub target_fill_size: usize,
    /// Session state.
    pub state: PlaybackState,
    /// Notifications dropped on a full channel.
    pub dropped_notifications: u32,
}

impl StatusReport {
    /// Snapshot `playback`.
    pub fn capture<const N: usize, const Q: usize>(playback: &SharedPlayback<'_, N, Q>) -> Self {
        playback.lock(|p| Self {
            sample_rate_hz: p.format().sample_rate.get(),
            packet_size: p.packet_size(),
            buffer_size: p.buffer_size(),
            fill_size: p.fill_size(),
            target_fill_size: p.target_fill_size(),
            state: p.state(),
            dropped_notifications: p.dropped_notifications(),
        })
    }

    /// Write the report to the log.
    pub fn log(&self) {
        #[cfg(feature = "defmt")]
        defmt::info!(
            "playback {}: fill {}/{} (target {}), {} Hz, dropped {}",
            self.state,
            self.fill_size,
            self.buffer_size,
            self.target_fill_size,
            self.sample_rate_hz,
            self.dropped_notifications
        );
        #[cfg(feature = "std")]
        tracing::info!(
            state = self.state.as_str(),
            fill = self.fill_size,
            buffer = self.buffer_size,
            target = self.target_fill_size,
            rate_hz = self.sample_rate_hz,
            dropped = self.dropped_notifications,
            "playback status"
        );
    }
}

/// Log a [`StatusReport`] every `period`, forever.
pub async fn report_loop<const N: usize, const Q: usize>(
    playback: &SharedPlayback<'_, N, Q>,
    period: Duration,
) -> ! {
    loop {
        Timer::after(period).await;
        StatusReport::capture(playback).log();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use platform::mocks::{MockTxStream, MockUsbEndpoint};
    use playback::NotificationChannel;

    #[test]
    fn test_capture_idle_defaults() {
        let ch: NotificationChannel = NotificationChannel::new();
        let shared = SharedPlayback::<4096, 4>::new(&ch);

        let report = StatusReport::capture(&shared);

        assert_eq!(report.sample_rate_hz, 48_000);
        assert_eq!(report.state, PlaybackState::Idle);
        assert_eq!(report.fill_size, 0);
        assert_eq!(report.dropped_notifications, 0);
    }

    #[test]
    fn test_capture_while_buffering() {
        let ch: NotificationChannel = NotificationChannel::new();
        let shared = SharedPlayback::<4096, 4>::new(&ch);
        let mut usb = MockUsbEndpoint::new();

        shared.start_streaming(&mut usb);
        for _ in 0..3 {
            shared.on_packet_received(192, &mut usb, &MockTxStream::new());
        }
        let report = StatusReport::capture(&shared);
        report.log();

        assert_eq!(report.state, PlaybackState::Buffering);
        assert_eq!(report.packet_size, 192);
        assert_eq!(report.buffer_size, 1536);
        assert_eq!(report.fill_size, 576);
        assert_eq!(report.target_fill_size, 864);
    }

    #[test]
    fn test_default_period_is_one_second() {
        assert_eq!(REPORT_PERIOD.as_millis(), 1000);
    }
}
