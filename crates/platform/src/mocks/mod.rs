//! Mock implementations for testing
//!
//! This module provides mock implementations of all platform traits
//! for use in unit and integration tests.

#![cfg(any(test, feature = "std"))]

use crate::{I2sOutput, TxStream, UsbAudioEndpoint};

/// Number of calls each mock remembers before dropping the oldest.
pub const MOCK_HISTORY_DEPTH: usize = 32;

/// One reception region armed through [`UsbAudioEndpoint::start_receive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmedRegion {
    /// Address of the first byte of the region.
    pub addr: usize,
    /// Region length (the maximum packet size).
    pub len: usize,
}

impl ArmedRegion {
    /// Offset of this region from `base`, or `None` if it starts before it.
    pub fn offset_from(&self, base: *const u8) -> Option<usize> {
        self.addr.checked_sub(base as usize)
    }
}

/// Mock USB audio endpoint
pub struct MockUsbEndpoint {
    armed: heapless::Deque<ArmedRegion, MOCK_HISTORY_DEPTH>,
    arm_count: usize,
    feedback_count: usize,
    last_feedback_len: Option<usize>,
}

impl MockUsbEndpoint {
    /// Create new mock endpoint
    pub fn new() -> Self {
        Self {
            armed: heapless::Deque::new(),
            arm_count: 0,
            feedback_count: 0,
            last_feedback_len: None,
        }
    }

    /// Total number of `start_receive` calls
    pub fn arm_count(&self) -> usize {
        self.arm_count
    }

    /// Most recently armed region
    pub fn last_armed(&self) -> Option<ArmedRegion> {
        self.armed.back().copied()
    }

    /// Remembered armed regions, oldest first
    pub fn armed(&self) -> impl Iterator<Item = &ArmedRegion> {
        self.armed.iter()
    }

    /// Total number of `transmit_feedback` calls
    pub fn feedback_count(&self) -> usize {
        self.feedback_count
    }

    /// Payload length of the last feedback packet
    pub fn last_feedback_len(&self) -> Option<usize> {
        self.last_feedback_len
    }
}

impl Default for MockUsbEndpoint {
    fn default() -> Self {
        Self::new()
    }
}

impl UsbAudioEndpoint for MockUsbEndpoint {
    fn start_receive(&mut self, region: &mut [u8]) {
        if self.armed.is_full() {
            self.armed.pop_front();
        }
        // Cannot fail: one slot was freed above when full.
        let _ = self.armed.push_back(ArmedRegion {
            addr: region.as_ptr() as usize,
            len: region.len(),
        });
        self.arm_count = self.arm_count.saturating_add(1);
    }

    fn transmit_feedback(&mut self, payload: &[u8]) {
        self.feedback_count = self.feedback_count.saturating_add(1);
        self.last_feedback_len = Some(payload.len());
    }
}

/// Mock I2S TX DMA stream
///
/// Holds a remaining-transfer count and an active flag that tests set
/// directly, standing in for the hardware NDTR register.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockTxStream {
    remaining: usize,
    active: bool,
}

impl MockTxStream {
    /// Create an inactive stream
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an active stream with `remaining` half-word transfers left
    pub fn active(remaining: usize) -> Self {
        Self {
            remaining,
            active: true,
        }
    }

    /// Set the remaining transfer count
    pub fn set_remaining(&mut self, remaining: usize) {
        self.remaining = remaining;
    }

    /// Set the active flag
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}

impl TxStream for MockTxStream {
    fn remaining_transfers(&self) -> usize {
        self.remaining
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// A call recorded by [`MockI2sOutput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputCall {
    /// `start_circular(len_bytes)`
    Start(usize),
    /// `stop()`
    Stop,
}

/// Mock I2S output
pub struct MockI2sOutput {
    running: bool,
    calls: heapless::Deque<OutputCall, MOCK_HISTORY_DEPTH>,
}

impl MockI2sOutput {
    /// Create a stopped mock output
    pub fn new() -> Self {
        Self {
            running: false,
            calls: heapless::Deque::new(),
        }
    }

    /// Remembered calls, oldest first
    pub fn calls(&self) -> impl Iterator<Item = &OutputCall> {
        self.calls.iter()
    }

    /// Number of `start_circular` calls remembered
    pub fn start_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, OutputCall::Start(_)))
            .count()
    }

    /// Number of `stop` calls remembered
    pub fn stop_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, OutputCall::Stop))
            .count()
    }

    fn record(&mut self, call: OutputCall) {
        if self.calls.is_full() {
            self.calls.pop_front();
        }
        let _ = self.calls.push_back(call);
    }
}

impl Default for MockI2sOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl I2sOutput for MockI2sOutput {
    type Error = core::convert::Infallible;

    async fn start_circular(&mut self, len_bytes: usize) -> Result<(), Self::Error> {
        self.running = true;
        self.record(OutputCall::Start(len_bytes));
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), Self::Error> {
        self.running = false;
        self.record(OutputCall::Stop);
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::arithmetic_side_effects,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_usb_records_armed_region() {
        let mut usb = MockUsbEndpoint::new();
        let mut buf = [0u8; 64];
        let base = buf.as_ptr();

        usb.start_receive(&mut buf[16..48]);

        let region = usb.last_armed().unwrap();
        assert_eq!(region.len, 32);
        assert_eq!(region.offset_from(base), Some(16));
        assert_eq!(usb.arm_count(), 1);
    }

    #[test]
    fn test_mock_usb_history_drops_oldest() {
        let mut usb = MockUsbEndpoint::new();
        let mut buf = [0u8; 8];
        for _ in 0..MOCK_HISTORY_DEPTH + 5 {
            usb.start_receive(&mut buf);
        }
        assert_eq!(usb.arm_count(), MOCK_HISTORY_DEPTH + 5);
        assert_eq!(usb.armed().count(), MOCK_HISTORY_DEPTH);
    }

    #[test]
    fn test_mock_usb_feedback() {
        let mut usb = MockUsbEndpoint::new();
        assert_eq!(usb.last_feedback_len(), None);
        usb.transmit_feedback(&[]);
        assert_eq!(usb.feedback_count(), 1);
        assert_eq!(usb.last_feedback_len(), Some(0));
    }

    #[test]
    fn test_mock_tx_stream() {
        let mut tx = MockTxStream::new();
        assert!(!tx.is_active());
        tx.set_active(true);
        tx.set_remaining(100);
        assert!(tx.is_active());
        assert_eq!(tx.remaining_transfers(), 100);
    }

    #[tokio::test]
    async fn test_mock_i2s_output() {
        let mut out = MockI2sOutput::new();
        assert!(!out.is_running());

        out.start_circular(1536).await.unwrap();
        assert!(out.is_running());

        out.stop().await.unwrap();
        assert!(!out.is_running());

        let calls: heapless::Vec<OutputCall, 4> = out.calls().copied().collect();
        assert_eq!(calls.as_slice(), &[OutputCall::Start(1536), OutputCall::Stop]);
        assert_eq!(out.start_count(), 1);
        assert_eq!(out.stop_count(), 1);
    }
}
