//! USB audio bridge firmware
//!
//! Application layer of a USB-audio-to-I2S bridge: wires the playback core
//! to the USB audio streaming interface and to the task that owns the I2S
//! TX DMA.
//!
//! # Architecture
//!
//! This firmware follows a layered architecture:
//!
//! ```text
//! Application Layer (this crate: USB glue, I2S owner task, status report)
//!         ↓
//! Playback core (playback crate)
//!         ↓
//! Platform HAL (platform crate: traits, format types, sizing)
//! ```
//!
//! # Features
//!
//! - `hardware` - Build for the embedded target (defmt logging everywhere)
//! - `std` - Host build, logging through `tracing`
//! - `defmt` - defmt logging and `defmt::Format` derives
//!
//! # Examples
//!
//! ## Hardware Target
//!
//! ```bash
//! cargo build --release --target thumbv7em-none-eabihf --features hardware
//! ```

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
// Upgrade relevant warns to deny; keep pedantic as warn (too noisy for firmware)
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Critical correctness: deny these
#![deny(clippy::await_holding_lock)] // holding a blocking Mutex across .await is a bug
#![deny(unsafe_op_in_unsafe_fn)]
// unsafe fn body is not implicitly unsafe block
// Logging discipline (allow println in tests via clippy.toml)
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![warn(clippy::dbg_macro)] // dbg! should not be left in committed code
// Intentional allows for this codebase:
#![allow(clippy::module_name_repetitions)] // common in Rust crates; not a real issue
#![allow(clippy::missing_errors_doc)] // most errors are self-explanatory
// Pedantic lints too noisy for firmware application code:
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::unused_async)]
#![allow(async_fn_in_trait)]

pub mod audio;

// Re-export key types
pub use audio::{
    on_sample_rate_request, on_set_interface, on_usb_reset, report_loop, AlternateSetting,
    OutputController, Playback, StatusReport, NOTIFICATIONS, PLAYBACK, REPORT_PERIOD,
};
