#![warn(missing_docs)]

//! teimgr-protocol: TEI management frames, message types, and link roles.

/// Frame serialization and deserialization.
pub mod frame_codec;
/// Management message types.
pub mod message;
/// Manager and entity roles.
pub mod role;
/// Local correlation id sequence for outbound frames.
pub mod sequence;

pub use frame_codec::{FrameDecoder, FrameEncoder};
pub use message::{Direction, EnumConverter, MessageType, TeiMessage};
pub use role::{EntityRole, Role};
pub use sequence::IdSequence;
