//! Frame encoding.

use byteorder::{BigEndian, ByteOrder};
use teimgr_core::constants::{FRAME_LEN, GROUP_TEI, TEI_ENTITY_ID, TEI_SAPI, UI_CONTROL};

use crate::message::{EnumConverter, TeiMessage};

/// Address octet 1 of a network-originated UI frame on SAPI 0 (C/R = 1).
const UNIT_DATA_SAPI_OCTET: u8 = (TEI_SAPI << 2) | 0x02;
/// Address octet 2 of a broadcast frame (group TEI, EA = 1).
const GROUP_ADDRESS_OCTET: u8 = (GROUP_TEI << 1) | 0x01;

/// Serializes TEI management messages into frames for transmission.
pub struct FrameEncoder;

impl FrameEncoder {
    /// Encodes a message into a fixed-size frame.
    pub fn encode(message: &TeiMessage) -> [u8; FRAME_LEN] {
        let mut frame = [0u8; FRAME_LEN];
        frame[0] = Self::sapi_octet(message.command);
        frame[1] = GROUP_ADDRESS_OCTET;
        frame[2] = UI_CONTROL;
        frame[3] = TEI_ENTITY_ID;
        BigEndian::write_u16(&mut frame[4..6], message.ri);
        frame[6] = message.message_type.to_u8();
        frame[7] = Self::action_indicator(message.tei);
        frame
    }

    /// Prefixes `payload` with the broadcast UI header used for network-side unit data.
    pub fn unit_data(payload: &[u8]) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(payload.len() + 3);
        buffer.extend_from_slice(&[UNIT_DATA_SAPI_OCTET, GROUP_ADDRESS_OCTET, UI_CONTROL]);
        buffer.extend_from_slice(payload);
        buffer
    }

    fn sapi_octet(command: bool) -> u8 {
        let mut octet = TEI_SAPI << 2;
        if command {
            octet |= 0x02;
        }
        octet
    }

    fn action_indicator(tei: u8) -> u8 {
        ((tei & 0x7f) << 1) | 0x01
    }
}
