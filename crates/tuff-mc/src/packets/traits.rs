//! Packet traits for serialization and deserialization.
//!
//! Every wire type implements [`Readable`] and [`Writable`]. A packet schema
//! is a struct whose fields are all wire types; the [`packet!`](crate::packet)
//! macro walks those fields in declaration order to implement the traits for
//! the struct itself, plus [`Packet`] and [`PacketSchema`].

use std::any::Any;
use std::fmt;

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{ProtocolError, Result};

/// A stable, explicit tag naming one packet schema.
///
/// Reverse registry lookup (schema to id) compares these tags, never the
/// structure of the packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(pub &'static str);

impl SchemaId {
    /// The tag as a string.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A value that can be read from a buffer.
pub trait Readable: Sized {
    /// Read the value from a buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is malformed or the buffer runs out.
    fn read(buf: &mut impl Buf) -> Result<Self>;
}

/// A value that can be written to a buffer.
pub trait Writable {
    /// Write the value to a buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented on the wire.
    fn write(&self, buf: &mut impl BufMut) -> Result<()>;
}

/// A decoded packet of any schema.
///
/// This is the type-erased view the registry and dispatcher work with.
pub trait Packet: Any + fmt::Debug + Send + Sync {
    /// The schema this packet belongs to.
    fn schema(&self) -> SchemaId;

    /// Write the packet's fields, in declaration order, without id or length.
    ///
    /// # Errors
    ///
    /// Returns an error if a field cannot be encoded.
    fn write_fields(&self, buf: &mut BytesMut) -> Result<()>;

    /// Upcast for downcasting to the concrete schema type.
    fn as_any(&self) -> &dyn Any;
}

impl dyn Packet + '_ {
    /// Downcast to a concrete packet type.
    #[must_use]
    pub fn downcast_ref<P: Packet>(&self) -> Option<&P> {
        self.as_any().downcast_ref()
    }

    /// Returns `true` if the packet is of type `P`.
    #[must_use]
    pub fn is<P: Packet>(&self) -> bool {
        self.as_any().is::<P>()
    }
}

/// A concrete packet schema with a compile-time tag.
pub trait PacketSchema: Packet + Readable + Writable {
    /// The schema tag.
    const SCHEMA: SchemaId;
}

/// Read one field of a schema, naming the field in the error on failure.
///
/// # Errors
///
/// Returns [`ProtocolError::InvalidPacketField`] wrapping the underlying error.
pub fn read_field<T: Readable>(
    buf: &mut impl Buf,
    packet: SchemaId,
    field: &'static str,
) -> Result<T> {
    T::read(buf).map_err(|e| ProtocolError::InvalidPacketField {
        packet,
        field,
        source: Box::new(e),
    })
}
