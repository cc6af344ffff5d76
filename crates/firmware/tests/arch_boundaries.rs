//! Architecture boundary tests: run with `cargo test -p firmware --test arch_boundaries`
// Architecture test file: expect/unwrap/panic are intentional test mechanisms.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::assertions_on_constants
)]
//!
//! These tests enforce the layering rules of the workspace:
//!   Rule 1: platform (HAL) must not depend on playback or firmware
//!   Rule 2: playback must depend only on platform
//!   Rule 3: firmware is the only crate that owns statics and tasks
//!
//! # How enforcement works
//!
//! These are compile-time rules enforced by the workspace Cargo.toml dependency
//! graph. The tests below verify them by naming the types each layer exposes
//! from the layer above it. If a lower crate gained a dependency on a higher
//! one, the workspace would contain a cycle and this binary would not build.

use platform::mocks::{MockI2sOutput, MockTxStream, MockUsbEndpoint};

/// The platform crate exposes its collaborator traits on its own.
#[test]
fn platform_hal_is_independent() {
    fn _assert_usb_trait_exists<T: platform::UsbAudioEndpoint>() {}
    fn _assert_tx_trait_exists<T: platform::TxStream>() {}
    fn _assert_output_trait_exists<T: platform::I2sOutput>() {}

    // The mocks implement every trait without touching playback or firmware.
    _assert_usb_trait_exists::<MockUsbEndpoint>();
    _assert_tx_trait_exists::<MockTxStream>();
    _assert_output_trait_exists::<MockI2sOutput>();
}

/// The playback core is generic over platform traits only.
#[test]
fn playback_core_uses_platform_traits_only() {
    fn _assert_core_is_generic<U: platform::UsbAudioEndpoint, T: platform::TxStream>(
        shared: &playback::SharedPlayback<'_, 4096, 4>,
        usb: &mut U,
        tx: &T,
    ) {
        shared.on_packet_received(0, usb, tx);
    }

    let ch: playback::NotificationChannel = playback::NotificationChannel::new();
    let shared = playback::SharedPlayback::<4096, 4>::new(&ch);
    _assert_core_is_generic(&shared, &mut MockUsbEndpoint::new(), &MockTxStream::new());
    assert_eq!(shared.state(), playback::PlaybackState::Idle);
}

/// Board-level statics live in firmware and use platform's sizing.
#[test]
fn firmware_statics_use_platform_capacity() {
    use platform::audio_config::PLAYBACK_BUFFER_CAPACITY;

    assert_eq!(
        playback::CircularAudioBuffer::<PLAYBACK_BUFFER_CAPACITY>::CAPACITY,
        PLAYBACK_BUFFER_CAPACITY
    );
    // The static is usable without any initialisation call.
    assert_eq!(firmware::PLAYBACK.dropped_notifications(), 0);
}
