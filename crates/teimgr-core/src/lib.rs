#![warn(missing_docs)]

//! teimgr-core: foundational types shared by every layer of the TEI engine.
//!
//! This crate provides the minimal set of utilities the other crates build on:
//! - Protocol constants (SAPI, group TEI, management entity id)
//! - Configuration types
//! - Error handling
//! - Entity handles
//! - Transport and timer service abstractions
//!
//! Protocol-specific logic lives in specialized crates:
//! - `teimgr-protocol`: frame codec, message types, link roles
//! - `teimgr-session`: per-entity TEI state machine and the outbound send queue
//! - `teimgr-manager`: entity registry, inbound dispatch, device host

/// Protocol constants shared across layers.
pub mod constants {
    /// SAPI used by layer-2 management frames.
    pub const TEI_SAPI: u8 = 0;
    /// Group (broadcast) TEI. Also marks an entity as "no TEI assigned".
    pub const GROUP_TEI: u8 = 127;
    /// Highest TEI that may be pinned administratively.
    pub const MAX_FIXED_TEI: u8 = 63;
    /// First TEI of the range handed out by automatic assignment.
    pub const FIRST_DYNAMIC_TEI: u8 = 64;
    /// Layer management entity identifier carried in octet 4 of every frame.
    pub const TEI_ENTITY_ID: u8 = 0x0f;
    /// Control field of an unnumbered information (UI) frame.
    pub const UI_CONTROL: u8 = 0x03;
    /// Mask applied to the control field before comparing it with [`UI_CONTROL`] (drops the P/F bit).
    pub const UI_CONTROL_MASK: u8 = 0xef;
    /// Length of a TEI management frame in octets.
    pub const FRAME_LEN: usize = 8;
    /// Exclusive upper bound of the local correlation sequence; it wraps back to 1 here.
    pub const CORRELATION_SEQUENCE_LIMIT: u16 = 0x7fff;
}

/// Configuration options for the TEI engine.
pub mod config;
/// Error types and results.
pub mod error;
/// Generational handles identifying registered layer-2 entities.
pub mod handle;
/// Timer service abstraction and a deadline-driven implementation.
pub mod timer;
/// Transport abstraction for the physical management channel.
pub mod transport;
