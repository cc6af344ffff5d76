//! End-to-end playback scenarios through the shared, interrupt-safe handle.

#![allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]

use platform::{
    audio_config::PLAYBACK_BUFFER_CAPACITY,
    audio_types::{SampleRateHz, SampleWidth},
    mocks::{MockTxStream, MockUsbEndpoint},
};
use playback::{AudioFormat, Notification, NotificationChannel, PlaybackState, SharedPlayback};

type Shared<'a> = SharedPlayback<'a, PLAYBACK_BUFFER_CAPACITY, 4>;

fn drain(ch: &NotificationChannel) -> Vec<Notification> {
    core::iter::from_fn(|| ch.try_receive()).collect()
}

#[test]
fn buffering_reaches_target_on_fifth_packet() {
    let ch = NotificationChannel::new();
    let shared = Shared::new(&ch);
    let mut usb = MockUsbEndpoint::new();
    let tx = MockTxStream::new();

    shared.start_streaming(&mut usb);
    assert_eq!(shared.buffer_size(), 1536);
    assert_eq!(shared.target_fill_size(), 864);

    for _ in 0..4 {
        shared.on_packet_received(192, &mut usb, &tx);
    }
    assert!(!shared.is_playback_enabled());

    shared.on_packet_received(192, &mut usb, &tx);
    assert!(shared.is_playback_enabled());
    assert_eq!(drain(&ch), vec![Notification::BeginOutput]);
}

#[test]
fn packet_across_nominal_end_wraps_to_156() {
    let ch = NotificationChannel::new();
    let shared = Shared::new(&ch);
    let mut usb = MockUsbEndpoint::new();
    let tx = MockTxStream::new();

    shared.start_streaming(&mut usb);
    for _ in 0..7 {
        shared.receive_packet(&[0u8; 192], &mut usb, &tx);
    }
    shared.receive_packet(&[0u8; 156], &mut usb, &tx);
    assert_eq!(shared.write_offset(), 1500);

    let packet: Vec<u8> = (0..192u32).map(|i| (i % 251) as u8 + 1).collect();
    shared.receive_packet(&packet, &mut usb, &tx);

    assert_eq!(shared.write_offset(), 156);
    shared.lock(|p| {
        assert_eq!(&p.buffer()[1500..1536], &packet[..36]);
        assert_eq!(&p.buffer()[..156], &packet[36..]);
    });
}

#[test]
fn transport_failure_while_playing_returns_to_idle() {
    let ch = NotificationChannel::new();
    let shared = Shared::new(&ch);
    let mut usb = MockUsbEndpoint::new();
    let tx = MockTxStream::new();

    shared.start_streaming(&mut usb);
    for _ in 0..5 {
        shared.on_packet_received(192, &mut usb, &tx);
    }
    assert!(shared.is_playback_enabled());

    shared.on_packet_received(0, &mut usb, &tx);

    assert!(!shared.is_playback_enabled());
    assert!(!shared.is_streaming_enabled());
    assert_eq!(
        drain(&ch),
        vec![Notification::BeginOutput, Notification::EndOutput]
    );
}

#[test]
fn wide_samples_reach_the_buffer_half_word_swapped() {
    let ch = NotificationChannel::new();
    let shared = Shared::new(&ch);
    let mut usb = MockUsbEndpoint::new();

    shared
        .set_format(AudioFormat {
            sample_width: SampleWidth::Bits32,
            ..AudioFormat::DEFAULT
        })
        .unwrap();
    shared.start_streaming(&mut usb);
    assert_eq!(shared.packet_size(), 384);

    let mut sample = [0u8; 4];
    sample[..2].copy_from_slice(&0x1234u16.to_ne_bytes());
    sample[2..].copy_from_slice(&0x5678u16.to_ne_bytes());
    shared.receive_packet(&sample, &mut usb, &MockTxStream::new());

    shared.lock(|p| {
        let b = p.buffer();
        assert_eq!(u16::from_ne_bytes([b[0], b[1]]), 0x5678);
        assert_eq!(u16::from_ne_bytes([b[2], b[3]]), 0x1234);
    });
}

#[test]
fn notifications_keep_session_order() {
    let ch = NotificationChannel::new();
    let shared = Shared::new(&ch);
    let mut usb = MockUsbEndpoint::new();
    let tx = MockTxStream::new();

    for _ in 0..2 {
        shared.start_streaming(&mut usb);
        for _ in 0..5 {
            shared.on_packet_received(192, &mut usb, &tx);
        }
        shared.stop_streaming();
    }

    assert_eq!(
        drain(&ch),
        vec![
            Notification::BeginOutput,
            Notification::EndOutput,
            Notification::BeginOutput,
            Notification::EndOutput,
        ]
    );
    assert_eq!(shared.state(), PlaybackState::Idle);
}

#[test]
fn rate_change_between_sessions() {
    let ch = NotificationChannel::new();
    let shared = Shared::new(&ch);
    let mut usb = MockUsbEndpoint::new();

    shared.set_sample_rate(SampleRateHz::MIN_HZ).unwrap();
    shared.start_streaming(&mut usb);

    assert_eq!(shared.packet_size(), 128);
    assert_eq!(shared.buffer_size(), 1024);
    assert_eq!(shared.target_fill_size(), 576);
}
