//! Protocol error types.

use std::io;

use thiserror::Error;

use crate::packets::traits::SchemaId;
use crate::state::{Direction, Phase};

/// Errors that can occur when reading or writing protocol data.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// An I/O error occurred, including running out of bytes mid-frame.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A `VarInt` was too big (more than 5 bytes).
    #[error("VarInt is too big")]
    VarIntTooBig,

    /// A `VarLong` was too big (more than 10 bytes).
    #[error("VarLong is too big")]
    VarLongTooBig,

    /// A string exceeded the maximum length.
    #[error("String too long: {len} bytes (max {max})")]
    StringTooLong {
        /// The actual length of the string.
        len: usize,
        /// The maximum allowed length.
        max: usize,
    },

    /// A packet exceeded the maximum length.
    #[error("Packet too long: {len} bytes (max {max})")]
    PacketTooLong {
        /// The actual length of the packet.
        len: usize,
        /// The maximum allowed length.
        max: usize,
    },

    /// A frame was cut short or its packet id ran past the frame end.
    #[error("Malformed frame: {0}")]
    MalformedFrame(&'static str),

    /// No schema is bound to this id for the phase and direction.
    #[error("Invalid packet id {id:#04x} ({direction} in {phase})")]
    InvalidPacketId {
        /// The phase the lookup was scoped to.
        phase: Phase,
        /// The direction the lookup was scoped to.
        direction: Direction,
        /// The unbound packet id.
        id: i32,
    },

    /// The schema has no id binding in the phase.
    #[error("Invalid packet type {schema} in {phase}")]
    InvalidPacketType {
        /// The phase the lookup was scoped to.
        phase: Phase,
        /// The unbound schema.
        schema: SchemaId,
    },

    /// A field of a packet could not be decoded.
    #[error("Invalid packet field {packet}.{field}: {source}")]
    InvalidPacketField {
        /// The packet schema being decoded.
        packet: SchemaId,
        /// The field name.
        field: &'static str,
        /// What went wrong while reading the field.
        #[source]
        source: Box<ProtocolError>,
    },

    /// A phase value outside the known range was received.
    #[error("Invalid phase: {0}")]
    InvalidPhase(i32),

    /// A structured-value field could not be parsed or serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProtocolError {
    /// Returns `true` if the error only means the peer closed the stream
    /// between frames.
    ///
    /// Running out of bytes inside a frame is reported as
    /// [`MalformedFrame`](Self::MalformedFrame) instead.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof)
    }
}

/// Result type alias using [`ProtocolError`].
pub type Result<T> = std::result::Result<T, ProtocolError>;
