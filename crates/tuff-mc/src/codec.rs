//! Packet framing codec.
//!
//! Packets are framed as:
//! - `[VarInt length][VarInt packet_id][fields...]`
//!
//! The length includes the packet ID and fields, but not itself. Fields
//! carry no names or tags; their order is the schema's declaration order.

use std::io;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::error::{ProtocolError, Result};
use crate::packets::traits::Packet;
use crate::registry::Schema;
use crate::varint::{read_varint, read_varint_from_buf, varint_len, write_varint_to_buf};

/// Maximum packet size (2 MiB, same as vanilla).
pub const MAX_PACKET_SIZE: usize = 2 * 1024 * 1024;

/// A packet id with its still-encoded fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPacket {
    /// The packet ID.
    pub id: i32,
    /// The encoded fields (without the packet ID).
    pub payload: Bytes,
}

impl RawPacket {
    /// Create a new raw packet with the given ID and payload.
    #[must_use]
    pub fn new(id: i32, payload: impl Into<Bytes>) -> Self {
        Self {
            id,
            payload: payload.into(),
        }
    }

    /// Create a new raw packet with the given ID and an empty payload.
    #[must_use]
    pub const fn empty(id: i32) -> Self {
        Self {
            id,
            payload: Bytes::new(),
        }
    }

    /// Encode a packet's fields under the given id.
    ///
    /// # Errors
    ///
    /// Returns an error if a field cannot be encoded.
    pub fn encode(id: i32, packet: &dyn Packet) -> Result<Self> {
        let mut payload = BytesMut::new();
        packet.write_fields(&mut payload)?;
        Ok(Self::new(id, payload))
    }

    /// Decode the payload into a packet of the given schema.
    ///
    /// # Errors
    ///
    /// Returns an error if any field fails to decode.
    pub fn decode(&self, schema: Schema) -> Result<Box<dyn Packet>> {
        let mut buf = self.payload.clone();
        let packet = schema.decode(&mut buf)?;

        if !buf.is_empty() {
            debug!(
                schema = %schema.id(),
                trailing = buf.len(),
                "Ignoring trailing bytes after last field"
            );
        }

        Ok(packet)
    }

    /// The complete frame: `[length][id][payload]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame would exceed [`MAX_PACKET_SIZE`].
    pub fn to_frame(&self) -> Result<BytesMut> {
        let total_len = varint_len(self.id) + self.payload.len();
        if total_len > MAX_PACKET_SIZE {
            return Err(ProtocolError::PacketTooLong {
                len: total_len,
                max: MAX_PACKET_SIZE,
            });
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let total_len_i32 = total_len as i32;

        let mut buf = BytesMut::with_capacity(varint_len(total_len_i32) + total_len);
        write_varint_to_buf(&mut buf, total_len_i32);
        write_varint_to_buf(&mut buf, self.id);
        buf.extend_from_slice(&self.payload);

        Ok(buf)
    }
}

/// Read a raw packet from an async reader.
///
/// Reads exactly one frame. Bytes past the frame stay in the reader.
///
/// # Errors
///
/// Returns an error if:
/// - An I/O error occurs, including EOF before the length prefix
/// - The packet length is negative or exceeds [`MAX_PACKET_SIZE`]
/// - The frame is empty, cut short, or too short for its packet id
pub async fn read_packet<R: AsyncRead + Unpin>(reader: &mut R) -> Result<RawPacket> {
    let length = read_varint(reader).await?;

    let length = usize::try_from(length).map_err(|_| ProtocolError::PacketTooLong {
        len: 0,
        max: MAX_PACKET_SIZE,
    })?;

    if length > MAX_PACKET_SIZE {
        return Err(ProtocolError::PacketTooLong {
            len: length,
            max: MAX_PACKET_SIZE,
        });
    }

    if length == 0 {
        return Err(ProtocolError::MalformedFrame("empty frame"));
    }

    let mut data = BytesMut::zeroed(length);
    reader.read_exact(&mut data).await.map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            ProtocolError::MalformedFrame("stream ended inside a frame")
        } else {
            e.into()
        }
    })?;

    let mut data = data.freeze();
    let id = read_varint_from_buf(&mut data).map_err(|e| match e {
        ProtocolError::Io(_) => ProtocolError::MalformedFrame("packet id runs past the frame"),
        other => other,
    })?;

    Ok(RawPacket { id, payload: data })
}

/// Write a raw packet to an async writer.
///
/// The whole frame goes out in one `write_all`, so no half-written length
/// prefix is left behind on a framing error.
///
/// # Errors
///
/// Returns an error if the frame is too long or an I/O error occurs.
pub async fn write_packet<W: AsyncWrite + Unpin>(writer: &mut W, packet: &RawPacket) -> Result<()> {
    let frame = packet.to_frame()?;
    writer.write_all(&frame).await?;
    writer.flush().await?;

    Ok(())
}
