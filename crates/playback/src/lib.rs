//! USB audio playback core: bridges isochronous USB OUT packets to a
//! continuously running I2S TX DMA across two unsynchronised clocks.
//!
//! # Data flow
//!
//! ```text
//! USB OUT complete ──▶ CircularAudioBuffer::write   (append, wrap tail)
//!                       └▶ SampleWordCorrector      (fix 32-bit word order)
//! TX DMA NDTR ───────▶ FillLevelTracker             (read offset, fill size)
//!                       └▶ PlaybackStateMachine     (latch at target fill)
//!                           └▶ NotificationChannel  ──▶ DMA-engine owner task
//! ```
//!
//! Everything here is `no_std`, allocation-free and non-blocking. Share a
//! session between interrupt handlers through [`SharedPlayback`].
#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]

pub mod circular_buffer;
pub mod config;
pub mod fill_level;
pub mod notification;
pub mod sample_word;
pub mod session;
pub mod shared;
pub mod state;

pub use circular_buffer::CircularAudioBuffer;
pub use config::{AudioFormat, BufferConfig, ConfigError};
pub use fill_level::FillLevelTracker;
pub use notification::{Notification, NotificationChannel, NOTIFICATION_CHANNEL_DEPTH};
pub use sample_word::SampleWordCorrector;
pub use session::UsbPlayback;
pub use shared::SharedPlayback;
pub use state::{PlaybackState, PlaybackStateMachine};
