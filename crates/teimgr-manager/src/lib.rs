#![warn(missing_docs)]

//! teimgr-manager: link manager, entity registry and a lock-owning device host.

/// Thread-safe device host around a link manager.
pub mod device;
/// Events delivered to entity owners.
pub mod event_types;
/// TEI management for one physical link.
pub mod link_manager;
/// Generational entity arena.
pub mod registry;
/// Time sources for the device host.
pub mod time;

pub use device::Device;
pub use event_types::TeiEvent;
pub use link_manager::LinkManager;
pub use registry::{ChannelRequest, EntityRegistry, Layer2Entity};
pub use time::{Clock, ManualClock, SystemClock};
