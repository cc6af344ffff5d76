//! Start/stop notifications for the owner of the I2S DMA.
//!
//! Posting happens with the playback critical section held, usually from
//! the USB interrupt, so it never waits: a full channel drops the message
//! and bumps a fault counter. The owner task drains the channel and does
//! the actual peripheral start/stop.
//!
//! # Capacity
//!
//! A session boundary produces at most one `BeginOutput` and one
//! `EndOutput`. A depth of [`NOTIFICATION_CHANNEL_DEPTH`] lets two complete
//! sessions queue up before the owner runs.

use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};

/// Default channel depth: two start/stop pairs.
pub const NOTIFICATION_CHANNEL_DEPTH: usize = 4;

/// Control message for the DMA-engine owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Notification {
    /// Target fill reached: start continuous output.
    BeginOutput,
    /// Playback released: stop output.
    EndOutput,
}

/// Bounded, non-blocking notification channel with a drop counter.
pub struct NotificationChannel<const Q: usize = NOTIFICATION_CHANNEL_DEPTH> {
    channel: Channel<CriticalSectionRawMutex, Notification, Q>,
    dropped: AtomicU32,
}

impl Notification {
    /// Short label for log output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BeginOutput => "begin-output",
            Self::EndOutput => "end-output",
        }
    }
}

impl<const Q: usize> NotificationChannel<Q> {
    /// Empty channel. Usable in a `static`.
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            dropped: AtomicU32::new(0),
        }
    }

    /// Post without waiting.
    ///
    /// Returns `false` if the channel was full and the notification was
    /// dropped. The drop is counted and logged here, callers only need the
    /// return value for their own bookkeeping.
    pub fn post(&self, notification: Notification) -> bool {
        if self.channel.try_send(notification).is_ok() {
            return true;
        }

        // fetch_add wraps; the count is diagnostic only.
        let _dropped = self.dropped.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        #[cfg(feature = "defmt")]
        defmt::warn!(
            "notification channel full, dropped {} (total {})",
            notification,
            _dropped
        );
        #[cfg(feature = "std")]
        tracing::warn!(
            notification = notification.as_str(),
            total = _dropped,
            "notification channel full, dropped"
        );
        false
    }

    /// Next queued notification, if any.
    pub fn try_receive(&self) -> Option<Notification> {
        self.channel.try_receive().ok()
    }

    /// Wait for the next notification.
    pub async fn receive(&self) -> Notification {
        self.channel.receive().await
    }

    /// Notifications dropped because the channel was full.
    pub fn dropped_count(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<const Q: usize> Default for NotificationChannel<Q> {
    fn default() -> Self {
        Self::new()
    }
}
