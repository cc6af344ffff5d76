//! USB audio streaming interface glue.
//!
//! The host opens the stream by selecting a non-zero alternate setting on
//! the audio streaming interface and closes it with alternate setting 0
//! (zero bandwidth). A bus reset closes it too. These handlers run in USB
//! interrupt context and map those events onto the playback session.

use platform::UsbAudioEndpoint;
use playback::{ConfigError, SharedPlayback};

/// Alternate setting of the audio streaming interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlternateSetting {
    /// Alternate 0: no isochronous bandwidth, stream closed.
    ZeroBandwidth,
    /// Any other alternate: stream open.
    Operational,
}

impl AlternateSetting {
    /// Classify a raw `bAlternateSetting` value.
    pub fn from_alt(alt: u8) -> Self {
        if alt == 0 {
            Self::ZeroBandwidth
        } else {
            Self::Operational
        }
    }
}

impl From<u8> for AlternateSetting {
    fn from(alt: u8) -> Self {
        Self::from_alt(alt)
    }
}

/// SET_INTERFACE on the audio streaming interface.
pub fn on_set_interface<const N: usize, const Q: usize, U: UsbAudioEndpoint>(
    playback: &SharedPlayback<'_, N, Q>,
    usb: &mut U,
    alt: AlternateSetting,
) {
    #[cfg(feature = "defmt")]
    defmt::debug!("audio streaming interface: {}", alt);
    #[cfg(feature = "std")]
    tracing::debug!(alt = ?alt, "audio streaming interface");

    match alt {
        AlternateSetting::Operational => playback.start_streaming(usb),
        AlternateSetting::ZeroBandwidth => playback.stop_streaming(),
    }
}

/// USB bus reset: any open stream is gone.
pub fn on_usb_reset<const N: usize, const Q: usize>(playback: &SharedPlayback<'_, N, Q>) {
    #[cfg(feature = "defmt")]
    defmt::debug!("USB reset, stopping audio stream");
    #[cfg(feature = "std")]
    tracing::debug!("USB reset, stopping audio stream");

    playback.stop_streaming();
}

/// SET_CUR on the sampling frequency control.
///
/// The new rate applies immediately while idle, otherwise at the next
/// session start. Unsupported rates are rejected and the current format is
/// kept.
pub fn on_sample_rate_request<const N: usize, const Q: usize>(
    playback: &SharedPlayback<'_, N, Q>,
    rate_hz: u32,
) -> Result<(), ConfigError> {
    let result = playback.set_sample_rate(rate_hz);
    match &result {
        Ok(()) => {
            #[cfg(feature = "defmt")]
            defmt::info!("sample rate set to {} Hz", rate_hz);
            #[cfg(feature = "std")]
            tracing::info!(rate_hz, "sample rate set");
        }
        Err(_e) => {
            #[cfg(feature = "defmt")]
            defmt::warn!("sample rate {} Hz rejected: {}", rate_hz, _e);
            #[cfg(feature = "std")]
            tracing::warn!(rate_hz, error = %_e, "sample rate rejected");
        }
    }
    result
}
