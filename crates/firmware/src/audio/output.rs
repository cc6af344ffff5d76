//! I2S DMA owner: turns start/stop notifications into peripheral calls.
//!
//! The playback core never touches the I2S peripheral. It posts
//! [`Notification`]s from interrupt context, and the task owning the
//! [`I2sOutput`] applies them here, at thread priority, where awaiting the
//! driver is allowed.

use platform::I2sOutput;
use playback::{Notification, NotificationChannel, SharedPlayback};

/// Applies notifications to an [`I2sOutput`].
///
/// Driver failures are logged and counted; the next notification is still
/// applied. The count saturates at [`u32::MAX`].
pub struct OutputController<O: I2sOutput> {
    output: O,
    failures: u32,
}

impl<O: I2sOutput> OutputController<O> {
    /// Wrap an output that is currently stopped.
    pub fn new(output: O) -> Self {
        Self {
            output,
            failures: 0,
        }
    }

    /// Apply one notification.
    ///
    /// `BeginOutput` starts circular transmission over the first
    /// `buffer_len` bytes (the nominal buffer); `EndOutput` stops it. Both
    /// are no-ops if the output is already in the requested state.
    pub async fn apply(
        &mut self,
        notification: Notification,
        buffer_len: usize,
    ) -> Result<(), O::Error> {
        match notification {
            Notification::BeginOutput => {
                if self.output.is_running() {
                    return Ok(());
                }
                #[cfg(feature = "defmt")]
                defmt::info!("I2S output start, {} bytes circular", buffer_len);
                #[cfg(feature = "std")]
                tracing::info!(buffer_len, "I2S output start");
                self.output.start_circular(buffer_len).await
            }
            Notification::EndOutput => {
                if !self.output.is_running() {
                    return Ok(());
                }
                #[cfg(feature = "defmt")]
                defmt::info!("I2S output stop");
                #[cfg(feature = "std")]
                tracing::info!("I2S output stop");
                self.output.stop().await
            }
        }
    }

    /// Apply every queued notification without waiting for more.
    ///
    /// Returns how many were applied.
    pub async fn drain_pending<const N: usize, const Q: usize>(
        &mut self,
        notifications: &NotificationChannel<Q>,
        playback: &SharedPlayback<'_, N, Q>,
    ) -> usize {
        let mut applied = 0usize;
        while let Some(notification) = notifications.try_receive() {
            self.handle(notification, playback.buffer_size()).await;
            applied = applied.saturating_add(1);
        }
        applied
    }

    /// Wait for notifications and apply them, forever.
    pub async fn run_output<const N: usize, const Q: usize>(
        &mut self,
        notifications: &NotificationChannel<Q>,
        playback: &SharedPlayback<'_, N, Q>,
    ) -> ! {
        loop {
            let notification = notifications.receive().await;
            self.handle(notification, playback.buffer_size()).await;
        }
    }

    async fn handle(&mut self, notification: Notification, buffer_len: usize) {
        if let Err(_e) = self.apply(notification, buffer_len).await {
            self.failures = self.failures.saturating_add(1);
            #[cfg(feature = "defmt")]
            defmt::error!("I2S output {} failed ({} total)", notification, self.failures);
            #[cfg(feature = "std")]
            tracing::error!(error = ?_e, failures = self.failures, "I2S output call failed");
        }
    }

    /// Number of driver calls that returned an error.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// The wrapped output.
    pub fn output(&self) -> &O {
        &self.output
    }
}
