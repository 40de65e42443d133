use std::collections::VecDeque;

use teimgr_core::transport::{CorrelationId, Link};
use teimgr_protocol::IdSequence;
use tracing::{error, trace};

/// Outbound frame queue for one link.
///
/// At most one frame is handed to the transport at a time. The next one leaves
/// only after the transport confirms the previous id, and nothing leaves while
/// the physical link is down.
#[derive(Debug, Default)]
pub struct SendQueue {
    /// Encoded frames waiting for the link
    frames: VecDeque<Vec<u8>>,
    link_active: bool,
    /// Id of the frame awaiting its transmit confirmation
    in_flight: Option<CorrelationId>,
    ids: IdSequence,
}

impl SendQueue {
    /// Creates an empty queue for an inactive link.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a frame. Requests link activation if the link is down, otherwise tries to send.
    pub fn enqueue<L: Link + ?Sized>(&mut self, frame: Vec<u8>, link: &mut L) {
        self.frames.push_back(frame);
        if self.link_active {
            self.try_send(link);
        } else {
            trace!(queued = self.frames.len(), "link inactive, requesting activation");
            link.request_activation();
        }
    }

    /// Hands the head frame to the transport unless the link is down or a frame is in flight.
    ///
    /// A frame the transport refuses is dropped and not retried.
    pub fn try_send<L: Link + ?Sized>(&mut self, link: &mut L) {
        if !self.link_active || self.in_flight.is_some() {
            return;
        }
        let Some(frame) = self.frames.pop_front() else {
            return;
        };
        let id = self.ids.next_id();
        match link.send_frame(id, &frame) {
            Ok(()) => {
                trace!(id = id.raw(), len = frame.len(), "frame handed to link");
                self.in_flight = Some(id);
            }
            Err(e) => {
                error!(id = id.raw(), "dropping frame, link refused it: {}", e);
                self.in_flight = None;
            }
        }
    }

    /// Transmit confirmation from the transport. Returns false for an unexpected id.
    pub fn on_ack<L: Link + ?Sized>(&mut self, id: CorrelationId, link: &mut L) -> bool {
        if self.in_flight != Some(id) {
            trace!(id = id.raw(), "ack does not match frame in flight");
            return false;
        }
        self.in_flight = None;
        self.try_send(link);
        true
    }

    /// Link came up; flushes the head of the queue.
    pub fn on_link_activated<L: Link + ?Sized>(&mut self, link: &mut L) {
        self.link_active = true;
        self.try_send(link);
    }

    /// Link went down; queued frames wait for the next activation.
    pub fn on_link_deactivated(&mut self) {
        self.link_active = false;
    }

    /// Returns true while a frame awaits its transmit confirmation.
    pub fn is_awaiting_ack(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Correlation id of the frame in flight.
    pub fn last_correlation_id(&self) -> Option<CorrelationId> {
        self.in_flight
    }

    /// Returns true if the physical link is up.
    pub fn is_link_active(&self) -> bool {
        self.link_active
    }

    /// Number of frames not yet handed to the transport.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns true if no frame is waiting.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
