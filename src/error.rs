//! Error kinds for payload decoding, framing and router operation.

use core::fmt::{Display, Formatter};
use std::error::Error;

/// A payload could not be decoded into a typed message.
#[derive(Debug)]
pub enum ParserError {
    /// The message id is not part of the loaded dialect.
    UnknownMessage { id: u32 },
    /// The payload is longer than the message's full encoded length.
    InvalidPayloadLength { id: u32, len: usize, max: usize },
    /// A field read ran past the end of the payload.
    InsufficientPayload(crate::bytes::Error),
}

impl Display for ParserError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnknownMessage { id } => write!(f, "Unknown message with ID {id:?}"),
            Self::InvalidPayloadLength { id, len, max } => write!(
                f,
                "Invalid payload length {len} for message ID {id:?}, at most {max} expected"
            ),
            Self::InsufficientPayload(e) => write!(f, "Failed to read payload field: {e}"),
        }
    }
}

impl Error for ParserError {}

impl From<crate::bytes::Error> for ParserError {
    fn from(e: crate::bytes::Error) -> Self {
        Self::InsufficientPayload(e)
    }
}

/// A frame could not be extracted from a byte stream or failed validation.
#[derive(Debug)]
pub enum FrameError {
    /// No start byte was found in the examined bytes.
    NotAFrame,
    /// A start byte was found but the frame is not complete yet.
    Incomplete,
    /// A v2 frame carried incompatibility flags we do not understand.
    IncompatibleFlags { flags: u8 },
    /// The trailer checksum does not match the computed one.
    ChecksumInvalid { found: u16, computed: u16 },
    /// The message id is not part of the loaded dialect; the frame may
    /// still be forwarded opaquely.
    UnknownMessage { id: u32 },
    /// The checksum matched but the payload did not decode.
    FailedToUnpack(ParserError),
}

impl Display for FrameError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotAFrame => write!(f, "No MAVLink start byte found"),
            Self::Incomplete => write!(f, "Frame incomplete, more bytes needed"),
            Self::IncompatibleFlags { flags } => {
                write!(f, "Unsupported incompatibility flags {flags:#04x}")
            }
            Self::ChecksumInvalid { found, computed } => write!(
                f,
                "Invalid checksum {found:#06x}, computed {computed:#06x}"
            ),
            Self::UnknownMessage { id } => write!(f, "Unknown message with ID {id:?}"),
            Self::FailedToUnpack(e) => write!(f, "Failed to unpack frame payload: {e}"),
        }
    }
}

impl Error for FrameError {}

impl From<ParserError> for FrameError {
    fn from(e: ParserError) -> Self {
        Self::FailedToUnpack(e)
    }
}

/// Errors surfaced by router startup and the [`RouterHandle`] operations.
///
/// [`RouterHandle`]: crate::RouterHandle
#[derive(Debug)]
pub enum RouterError {
    /// A connection string did not validate; startup is aborted.
    InvalidConnectionString { address: String, reason: String },
    /// No dialect (or an unknown one) was named at startup.
    NoDialectSet,
    /// A subscription named a message type the dialect does not know.
    InvalidMessage { name: String },
    /// A send named a protocol version other than 1 or 2.
    ProtocolUndefined { version: u8 },
    /// The router task is no longer running.
    Closed,
}

impl Display for RouterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidConnectionString { address, reason } => {
                write!(f, "Invalid connection string {address:?}: {reason}")
            }
            Self::NoDialectSet => write!(f, "No dialect set"),
            Self::InvalidMessage { name } => {
                write!(f, "Message type {name:?} is not in the loaded dialect")
            }
            Self::ProtocolUndefined { version } => {
                write!(f, "Protocol version {version} is undefined")
            }
            Self::Closed => write!(f, "Router is not running"),
        }
    }
}

impl Error for RouterError {}
