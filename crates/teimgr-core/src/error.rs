//! Error types for frame decoding and manager operations.

use thiserror::Error;

/// Result type alias using [`ErrorKind`].
pub type Result<T> = std::result::Result<T, ErrorKind>;

/// Reasons a received octet string is not a usable TEI management frame.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Fewer than eight octets.
    #[error("Frame too short: {len}/8 octets")]
    TooShort {
        /// Received length.
        len: usize,
    },
    /// SAPI field is not the management SAPI.
    #[error("Frame addressed to SAPI {0}")]
    WrongSapi(u8),
    /// Address extension bits are not (0, 1).
    #[error("Address extension bits malformed")]
    FormatError,
    /// TEI field of the address is not the group TEI.
    #[error("Frame addressed to TEI {0}, expected group TEI")]
    WrongGroup(u8),
    /// Control field is not UI.
    #[error("Control field 0x{0:02x} is not UI")]
    NotUnnumberedInfo(u8),
    /// Management entity identifier is not the TEI management entity.
    #[error("Unknown management entity 0x{0:02x}")]
    UnknownEntity(u8),
    /// Message type octet is outside 1..=7.
    #[error("Unknown TEI message type {0}")]
    UnknownMessageType(u8),
}

impl FrameError {
    /// Returns true for length and address-extension errors, which are reported to the
    /// caller instead of being silently discarded.
    pub fn is_structural(&self) -> bool {
        matches!(self, FrameError::TooShort { .. } | FrameError::FormatError)
    }
}

/// Errors returned by manager and session operations.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Inbound frame could not be decoded.
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),
    /// Entity requested on a SAPI other than 0.
    #[error("SAPI {0} is not supported")]
    UnsupportedSapi(u8),
    /// TEI outside the range allowed for this request.
    #[error("Invalid TEI {0}")]
    InvalidTei(u8),
    /// Entity protocol side is not allowed on this manager.
    #[error("Protocol {0} not supported by this link")]
    UnsupportedProtocol(&'static str),
    /// Message or operation not permitted for the manager's role.
    #[error("Role mismatch: {0}")]
    RoleMismatch(&'static str),
    /// Handle does not refer to a registered entity.
    #[error("Unknown entity {0}")]
    UnknownEntity(String),
}
