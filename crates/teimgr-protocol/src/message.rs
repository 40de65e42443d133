//! TEI management message types.
//!
//! This module provides the message-level types used throughout the engine:
//! - `MessageType`: the seven Q.921 TEI management procedures
//! - `Direction`: which side of the link originates a message type
//! - `TeiMessage`: a decoded (or to-be-encoded) management frame

use std::convert::TryFrom;

use teimgr_core::{constants::GROUP_TEI, error::FrameError};

/// Helper trait to convert enums to u8 values for wire format.
pub trait EnumConverter {
    /// Converts the enum to a u8 for serialization.
    fn to_u8(&self) -> u8;
}

/// Side of the link that sends a given message type.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Sent by the network, processed by terminals.
    FromNetwork,
    /// Sent by terminals, processed by the network.
    FromTerminal,
}

/// Message type octet (octet 7) of a TEI management frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// Identity request (terminal asks for a TEI).
    IdRequest = 1,
    /// Identity assigned.
    IdAssigned = 2,
    /// Identity denied.
    IdDenied = 3,
    /// Identity check request.
    IdCheckRequest = 4,
    /// Identity check response.
    IdCheckResponse = 5,
    /// Identity remove.
    IdRemove = 6,
    /// Identity verify.
    IdVerify = 7,
}

impl MessageType {
    /// All message types in wire order.
    pub const ALL: [MessageType; 7] = [
        MessageType::IdRequest,
        MessageType::IdAssigned,
        MessageType::IdDenied,
        MessageType::IdCheckRequest,
        MessageType::IdCheckResponse,
        MessageType::IdRemove,
        MessageType::IdVerify,
    ];

    /// Returns which side originates this message type.
    pub fn direction(&self) -> Direction {
        match self {
            MessageType::IdAssigned
            | MessageType::IdDenied
            | MessageType::IdCheckRequest
            | MessageType::IdRemove => Direction::FromNetwork,
            MessageType::IdRequest | MessageType::IdCheckResponse | MessageType::IdVerify => {
                Direction::FromTerminal
            }
        }
    }

    /// Short procedure name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            MessageType::IdRequest => "ID_REQUEST",
            MessageType::IdAssigned => "ID_ASSIGNED",
            MessageType::IdDenied => "ID_DENIED",
            MessageType::IdCheckRequest => "ID_CHK_REQ",
            MessageType::IdCheckResponse => "ID_CHK_RES",
            MessageType::IdRemove => "ID_REMOVE",
            MessageType::IdVerify => "ID_VERIFY",
        }
    }
}

impl EnumConverter for MessageType {
    fn to_u8(&self) -> u8 {
        *self as u8
    }
}

impl TryFrom<u8> for MessageType {
    type Error = FrameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(MessageType::IdRequest),
            2 => Ok(MessageType::IdAssigned),
            3 => Ok(MessageType::IdDenied),
            4 => Ok(MessageType::IdCheckRequest),
            5 => Ok(MessageType::IdCheckResponse),
            6 => Ok(MessageType::IdRemove),
            7 => Ok(MessageType::IdVerify),
            _ => Err(FrameError::UnknownMessageType(value)),
        }
    }
}

/// One TEI management message.
///
/// `tei` is the action indicator field: the TEI being assigned, checked or
/// removed, or [`GROUP_TEI`] when the message concerns every TEI (or none yet).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TeiMessage {
    /// Procedure.
    pub message_type: MessageType,
    /// Reference number correlating a response with its request.
    pub ri: u16,
    /// Action indicator TEI value (0..=127).
    pub tei: u8,
    /// Command/response bit of the address field; set on frames sent by the network.
    pub command: bool,
}

impl TeiMessage {
    /// Creates a message.
    pub fn new(message_type: MessageType, ri: u16, tei: u8, command: bool) -> Self {
        Self { message_type, ri, tei, command }
    }

    /// Returns true if the action indicator addresses every TEI.
    pub fn is_broadcast(&self) -> bool {
        self.tei == GROUP_TEI
    }
}
