//! Event types delivered to the owner of a link manager.
//!
//! Every notification a session raises for its entity, plus identity requests
//! the network side must answer, leaves the manager as a [`TeiEvent`] on a
//! crossbeam channel.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TrySendError};
use teimgr_core::handle::EntityHandle;
use tracing::{trace, warn};

/// Events pushed through the manager's event receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeiEvent {
    /// The entity now holds `tei`.
    AssignmentComplete {
        /// Entity that negotiated the TEI.
        entity: EntityHandle,
        /// Assigned TEI.
        tei: u8,
    },
    /// Identity requests went unanswered; the entity has no TEI.
    AssignmentFailed {
        /// Entity whose request failed.
        entity: EntityHandle,
    },
    /// The entity must release its TEI (call `release_tei`).
    RemovalRequested {
        /// Entity whose TEI is being removed.
        entity: EntityHandle,
    },
    /// The network assigned this entity's TEI to somebody else.
    ErrorDetected {
        /// Entity holding the duplicated TEI.
        entity: EntityHandle,
    },
    /// A terminal asked the network for a TEI; answer with `assign_fixed`.
    IdentityRequest {
        /// Reference value to echo in the assignment.
        ri: u16,
        /// Requested TEI, or the group TEI for "any".
        action_indicator: u8,
    },
}

impl TeiEvent {
    /// Entity the event concerns, if any.
    pub fn entity(&self) -> Option<EntityHandle> {
        match self {
            TeiEvent::AssignmentComplete { entity, .. }
            | TeiEvent::AssignmentFailed { entity }
            | TeiEvent::RemovalRequested { entity }
            | TeiEvent::ErrorDetected { entity } => Some(*entity),
            TeiEvent::IdentityRequest { .. } => None,
        }
    }
}

/// Minimal event sink abstraction to decouple from a concrete channel.
pub(crate) trait EventSink<E> {
    fn send(&mut self, event: E);
}

/// Channel-backed event sink using crossbeam `Sender`.
#[derive(Debug)]
pub(crate) struct ChannelSink<E>(Sender<E>);

impl<E> ChannelSink<E> {
    /// Creates a sink and its receiver. A `capacity` of 0 means unbounded.
    pub(crate) fn with_capacity(capacity: usize) -> (Self, Receiver<E>) {
        let (sender, receiver) = if capacity == 0 { unbounded() } else { bounded(capacity) };
        (Self(sender), receiver)
    }
}

impl<E: std::fmt::Debug> EventSink<E> for ChannelSink<E> {
    fn send(&mut self, event: E) {
        match self.0.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => warn!("event queue full, dropping {:?}", event),
            Err(TrySendError::Disconnected(event)) => trace!("no event receiver for {:?}", event),
        }
    }
}
