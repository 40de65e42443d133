//! TEI management frame serialization and deserialization.
//!
//! Provides the fixed eight-octet layout used on the management channel:
//!
//! ```text
//! octet 1: SAPI << 2 | C/R | EA0(0)
//! octet 2: GROUP_TEI << 1 | EA1(1)
//! octet 3: UI control
//! octet 4: management entity id (0x0f)
//! octet 5-6: reference number, big-endian
//! octet 7: message type
//! octet 8: action indicator (TEI << 1 | 1)
//! ```
//!
//! # Module Organization
//!
//! - [`encoder`] - Message encoding to the wire layout, plus the UI data header
//! - [`decoder`] - Validation and decoding of received frames

pub mod decoder;
pub mod encoder;


pub use decoder::FrameDecoder;
pub use encoder::FrameEncoder;
