#![warn(missing_docs)]

//! teimgr: ISDN Q.921 TEI management for layer-2 entities.
//!
//! This crate provides a small, stable surface that re-exports the most
//! commonly used types of the workspace:
//!
//! - Device host and events (`Device`, `LinkManager`, `TeiEvent`)
//! - Entity registration (`ChannelRequest`, `EntityHandle`)
//! - Transport seam (`Link`, `CorrelationId`) and configuration (`TeiConfig`)
//!
//! Example
//! ```ignore
//! use teimgr::prelude::*;
//!
//! let device = Device::new(Role::Terminal, my_d_channel, &TeiConfig::default());
//! let entity = device.create_entity(ChannelRequest::dynamic_terminal())?;
//! device.request_assignment(entity)?;
//!
//! // Driver side: feed indications and frames as they arrive.
//! device.on_link_activated();
//! device.dispatch_inbound(&frame)?;
//! device.poll();
//!
//! if let Some(TeiEvent::AssignmentComplete { tei, .. }) = device.recv() {
//!     println!("got TEI {}", tei);
//! }
//! ```

// Core types
pub use teimgr_core::{
    config::TeiConfig,
    constants::{GROUP_TEI, MAX_FIXED_TEI},
    error::{ErrorKind, FrameError, Result},
    handle::EntityHandle,
    timer::{DeadlineTimers, TimerService},
    transport::{CorrelationId, Link},
};
// Device host, link manager and events
pub use teimgr_manager::{
    ChannelRequest, Clock, Device, LinkManager, ManualClock, SystemClock, TeiEvent,
};
// Wire format and roles
pub use teimgr_protocol::{EntityRole, FrameDecoder, FrameEncoder, MessageType, Role, TeiMessage};
// Per-entity state
pub use teimgr_session::SessionState;

/// Convenience prelude with the most commonly used items.
pub mod prelude {
    pub use crate::{
        ChannelRequest, CorrelationId, Device, EntityHandle, EntityRole, Link, Role, TeiConfig,
        TeiEvent,
    };
}
