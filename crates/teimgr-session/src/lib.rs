#![warn(missing_docs)]

//! teimgr-session: per-entity TEI state machine and the outbound send queue.

/// Single-frame-in-flight outbound queue.
pub mod send_queue;
mod session;
mod session_state;

pub use send_queue::SendQueue;
pub use session::{
    BoundTei, EntityBinding, Notification, SessionAction, SessionContext, SessionInput, TeiSession,
};
pub use session_state::SessionState;
