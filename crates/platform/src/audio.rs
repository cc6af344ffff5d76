//! I2S output abstraction

/// Continuous I2S output, driven by the owner of the TX DMA engine.
///
/// The playback core never calls this trait. It posts start/stop
/// notifications, and the task that owns the peripheral applies them here.
pub trait I2sOutput {
    /// Error type
    type Error: core::fmt::Debug;

    /// Start circular transmission over the first `len_bytes` bytes of the
    /// playback buffer.
    fn start_circular(
        &mut self,
        len_bytes: usize,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Stop transmission.
    fn stop(&mut self) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Whether transmission is currently running.
    fn is_running(&self) -> bool;
}
