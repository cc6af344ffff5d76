//! USB audio streaming endpoint abstraction
//!
//! Only the primitives the playback path needs: arming reception of the next
//! isochronous OUT transaction and queueing a feedback IN packet. Descriptor
//! handling and class requests belong to the USB stack.

/// Isochronous audio endpoint pair (data OUT, feedback IN).
///
/// Both methods are called with the playback critical section held, from
/// interrupt context, and must not block.
pub trait UsbAudioEndpoint {
    /// Arm reception of the next OUT transaction into `region`.
    ///
    /// `region.len()` is the maximum packet size. The driver keeps writing
    /// into this memory until the transaction completes and then reports the
    /// received byte count (0 on failure) back to the playback core.
    fn start_receive(&mut self, region: &mut [u8]);

    /// Queue a feedback packet on the feedback IN endpoint.
    ///
    /// An empty payload tells the host the feedback value is not known yet.
    fn transmit_feedback(&mut self, payload: &[u8]);
}

impl<T: UsbAudioEndpoint + ?Sized> UsbAudioEndpoint for &mut T {
    fn start_receive(&mut self, region: &mut [u8]) {
        (**self).start_receive(region);
    }

    fn transmit_feedback(&mut self, payload: &[u8]) {
        (**self).transmit_feedback(payload);
    }
}
