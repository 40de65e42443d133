//! Transport abstraction for the physical management channel.

use std::io::Result;

/// Local identifier attached to each frame handed to the link.
///
/// The transport echoes it back in its transmit confirmation; it never goes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorrelationId(u32);

impl CorrelationId {
    /// Wraps a raw identifier.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw 32-bit value: sequence in the upper half, group TEI and SAPI tags below.
    pub fn raw(&self) -> u32 {
        self.0
    }

    /// Sequence number part of the identifier.
    pub fn sequence(&self) -> u16 {
        (self.0 >> 16) as u16
    }
}

/// Lower transport for TEI management frames.
///
/// This trait allows various transports (a D-channel driver, a loopback, a test
/// recorder) to be plugged into the link manager without coupling to a concrete
/// implementation.
pub trait Link {
    /// Hands one frame to the transport. The transport later confirms it with `id`.
    fn send_frame(&mut self, id: CorrelationId, frame: &[u8]) -> Result<()>;

    /// Asks the physical layer to activate; frames stay queued until it does.
    fn request_activation(&mut self);
}

impl<L: Link + ?Sized> Link for Box<L> {
    fn send_frame(&mut self, id: CorrelationId, frame: &[u8]) -> Result<()> {
        (**self).send_frame(id, frame)
    }

    fn request_activation(&mut self) {
        (**self).request_activation()
    }
}
