//! Frame decoding and validation.
//!
//! Checks run in wire order so the first mismatching field names the error:
//! length, SAPI, address extension bits, group TEI, control field, management
//! entity, message type.

use std::convert::TryFrom;

use byteorder::{BigEndian, ByteOrder};
use teimgr_core::{
    constants::{FRAME_LEN, GROUP_TEI, TEI_ENTITY_ID, TEI_SAPI, UI_CONTROL, UI_CONTROL_MASK},
    error::FrameError,
};

use crate::message::{MessageType, TeiMessage};

/// Deserializes TEI management frames received from the link.
pub struct FrameDecoder;

impl FrameDecoder {
    /// Validates and decodes a frame. Octets beyond the eighth are ignored.
    pub fn decode(frame: &[u8]) -> Result<TeiMessage, FrameError> {
        if frame.len() < FRAME_LEN {
            return Err(FrameError::TooShort { len: frame.len() });
        }
        let sapi = frame[0] >> 2;
        if sapi != TEI_SAPI {
            return Err(FrameError::WrongSapi(sapi));
        }
        if frame[0] & 0x01 != 0 || frame[1] & 0x01 == 0 {
            return Err(FrameError::FormatError);
        }
        let tei = frame[1] >> 1;
        if tei != GROUP_TEI {
            return Err(FrameError::WrongGroup(tei));
        }
        if frame[2] & UI_CONTROL_MASK != UI_CONTROL {
            return Err(FrameError::NotUnnumberedInfo(frame[2]));
        }
        if frame[3] != TEI_ENTITY_ID {
            return Err(FrameError::UnknownEntity(frame[3]));
        }
        let message_type = MessageType::try_from(frame[6])?;

        Ok(TeiMessage {
            message_type,
            ri: BigEndian::read_u16(&frame[4..6]),
            tei: frame[7] >> 1,
            command: frame[0] & 0x02 != 0,
        })
    }
}
