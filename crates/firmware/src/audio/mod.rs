//! Audio subsystem: USB audio streaming into the I2S playback buffer
//!
//! # Structure
//!
//! - `usb_stream`: USB interface glue (alternate settings, bus reset,
//!   sampling-frequency requests)
//! - `output`: the I2S DMA owner, applying start/stop notifications
//! - `status`: periodic fill-level report
//!
//! # Dependency Injection
//!
//! Application code targets the [`platform::UsbAudioEndpoint`],
//! [`platform::TxStream`] and [`platform::I2sOutput`] traits. Concrete
//! drivers are injected at the call site:
//!
//! ```rust,ignore
//! // USB OUT complete interrupt:
//! PLAYBACK.on_packet_received(size, &mut usb_ep, &i2s_tx_dma);
//!
//! // I2S owner task:
//! let mut ctrl = OutputController::new(i2s);
//! ctrl.run_output(&NOTIFICATIONS, &PLAYBACK).await;
//! ```

pub mod output;
pub mod status;
pub mod usb_stream;

use platform::audio_config::PLAYBACK_BUFFER_CAPACITY;
use playback::{NotificationChannel, SharedPlayback, NOTIFICATION_CHANNEL_DEPTH};

pub use output::OutputController;
pub use status::{report_loop, StatusReport, REPORT_PERIOD};
pub use usb_stream::{on_sample_rate_request, on_set_interface, on_usb_reset, AlternateSetting};

/// The playback core as instantiated on this board.
pub type Playback = SharedPlayback<'static, PLAYBACK_BUFFER_CAPACITY, NOTIFICATION_CHANNEL_DEPTH>;

/// Start/stop notifications from the USB interrupt to the I2S owner task.
pub static NOTIFICATIONS: NotificationChannel<NOTIFICATION_CHANNEL_DEPTH> =
    NotificationChannel::new();

/// The single playback path, shared by the USB interrupt handlers and the
/// I2S owner task.
pub static PLAYBACK: Playback = SharedPlayback::new(&NOTIFICATIONS);
