//! Protocol phases and packet directions.
//!
//! A packet id is only meaningful inside a `(Phase, Direction)` pair: the
//! same numeric id names different schemas in different phases and
//! directions.

use std::fmt;

use bytes::{Buf, BufMut};

use crate::error::{ProtocolError, Result};
use crate::packets::traits::{Readable, Writable};
use crate::types::VarInt;

/// The lifecycle stage of a connection.
///
/// Encoded on the wire as a `VarInt` (the handshake's next state field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    /// Initial connection state.
    Handshaking = 0,
    /// Server list ping.
    Status = 1,
    /// Authentication.
    Login = 2,
    /// In-game.
    Play = 3,
}

impl TryFrom<i32> for Phase {
    type Error = ProtocolError;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            0 => Ok(Self::Handshaking),
            1 => Ok(Self::Status),
            2 => Ok(Self::Login),
            3 => Ok(Self::Play),
            _ => Err(ProtocolError::InvalidPhase(value)),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Handshaking => "handshaking",
            Self::Status => "status",
            Self::Login => "login",
            Self::Play => "play",
        })
    }
}

impl Readable for Phase {
    fn read(buf: &mut impl Buf) -> Result<Self> {
        Self::try_from(VarInt::read(buf)?.0)
    }
}

impl Writable for Phase {
    fn write(&self, buf: &mut impl BufMut) -> Result<()> {
        VarInt(*self as i32).write(buf)
    }
}

/// Which way a packet travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// Client to server.
    Serverbound,
    /// Server to client.
    Clientbound,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Serverbound => "serverbound",
            Self::Clientbound => "clientbound",
        })
    }
}
