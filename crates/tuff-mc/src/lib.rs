//! Minecraft-style protocol implementation for Tuff.
//!
//! This crate provides the wire types, packet framing, schema-driven
//! packet codec and the `(phase, direction, id)` packet registry.

pub mod codec;
pub mod error;
pub mod packets;
pub mod registry;
pub mod state;
pub mod types;
pub mod varint;

pub use error::{ProtocolError, Result};
pub use packets::traits::{Packet, PacketSchema, Readable, SchemaId, Writable};
pub use registry::{PacketRegistry, Schema};
pub use state::{Direction, Phase};

#[doc(hidden)]
pub mod __private {
    pub use bytes::{Buf, BufMut, BytesMut};
}
