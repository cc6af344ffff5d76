//! Hardware abstraction layer for the USB audio playback path
//!
//! This crate provides the trait seams between the playback core and the
//! peripherals it touches, together with the audio format types and sizing
//! constants every layer agrees on.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (firmware crate: tasks, USB glue, I2S owner)
//!         ↓
//! Feature Layer (playback crate: circular buffer, fill level, state)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Hardware Layer (Embassy HAL + PAC)
//! ```
//!
//! # Abstractions
//!
//! - [`UsbAudioEndpoint`] - arm isochronous OUT reception, send feedback
//! - [`TxStream`] - I2S TX DMA progress (remaining transfers, active flag)
//! - [`I2sOutput`] - start and stop circular I2S transmission
//!
//! # Features
//!
//! - `std`: Expose the [`mocks`] module outside this crate's own tests
//! - `defmt`: Enable defmt::Format derives
//!
//! # Example
//!
//! ```no_run
//! use platform::I2sOutput;
//!
//! async fn example<O: I2sOutput>(out: &mut O, len: usize) {
//!     out.start_circular(len).await.unwrap();
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)] // unsafe fn body is not implicitly unsafe block
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![allow(clippy::doc_markdown)] // register names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors: callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(async_fn_in_trait)] // Embassy no_std: single-threaded, Send bounds not needed

pub mod audio;
pub mod audio_config;
pub mod audio_types;
pub mod dma;
pub mod mocks;
pub mod usb;

// Re-export main high-level traits
pub use audio::I2sOutput;
pub use dma::{TxSnapshot, TxStream};
pub use usb::UsbAudioEndpoint;

// Re-export format types
pub use audio_types::{ChannelCount, OutOfRangeError, SampleRateHz, SampleWidth};
