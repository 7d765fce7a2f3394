//! Per-connection state: the byte stream, the current phase and the
//! registry that phase-scoped id lookups resolve against.

use std::io;
use std::pin::Pin;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, ReadBuf};
use tracing::debug;
use tuff_mc::codec::{read_packet, write_packet};
use tuff_mc::{Direction, Packet, PacketRegistry, Phase, Result, Schema, SchemaId};

/// A registry shared by a server and all of its connections.
pub type SharedRegistry = Arc<RwLock<PacketRegistry>>;

/// Any bidirectional byte stream a connection can run over.
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Transport for T {}

/// A live client connection.
///
/// Implements [`AsyncRead`]/[`AsyncWrite`] for raw access to the stream;
/// [`read_packet`](Self::read_packet) and [`write_packet`](Self::write_packet)
/// go through the codec using the current phase.
pub struct Connection {
    id: usize,
    stream: BufReader<Box<dyn Transport>>,
    phase: Phase,
    registry: SharedRegistry,
}

impl Connection {
    /// Wrap a stream. The connection starts in [`Phase::Handshaking`].
    pub fn new(id: usize, stream: impl Transport + 'static, registry: SharedRegistry) -> Self {
        let stream: Box<dyn Transport> = Box::new(stream);
        Self {
            id,
            stream: BufReader::new(stream),
            phase: Phase::Handshaking,
            registry,
        }
    }

    /// The session id used in logs.
    #[must_use]
    pub const fn id(&self) -> usize {
        self.id
    }

    /// The current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Switch to another phase. Any phase may follow any other.
    pub fn set_phase(&mut self, phase: Phase) {
        debug!(from = %self.phase, to = %phase, "Phase transition");
        self.phase = phase;
    }

    /// Bind a packet id in the shared registry.
    ///
    /// The binding is visible to every connection of the same server.
    pub fn register_packet(
        &self,
        phase: Phase,
        direction: Direction,
        id: i32,
        schema: Schema,
    ) -> Option<Schema> {
        self.registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register(phase, direction, id, schema)
    }

    /// The schema bound to `id` in the current phase.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is bound.
    pub fn packet_schema(&self, direction: Direction, id: i32) -> Result<Schema> {
        self.registry().packet_schema(self.phase, direction, id)
    }

    /// The id bound to `schema` in the current phase.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema is unbound.
    pub fn packet_id(&self, schema: SchemaId) -> Result<i32> {
        self.registry().packet_id(self.phase, schema)
    }

    /// Read and decode the next packet travelling in `direction`.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame is malformed, the id has no binding in
    /// the current phase, or a field fails to decode.
    pub async fn read_packet(&mut self, direction: Direction) -> Result<Box<dyn Packet>> {
        let raw = read_packet(&mut self.stream).await?;
        self.registry().decode(self.phase, direction, &raw)
    }

    /// Encode and send a packet under its id in the current phase.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema is unbound, a field fails to encode,
    /// or the write fails.
    pub async fn write_packet(&mut self, packet: &dyn Packet) -> Result<()> {
        let raw = self.registry().encode(self.phase, packet)?;
        write_packet(&mut self.stream, &raw).await
    }

    /// Flush and shut down the write half of the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the shutdown fails.
    pub async fn close(&mut self) -> io::Result<()> {
        self.stream.shutdown().await
    }

    fn registry(&self) -> RwLockReadGuard<'_, PacketRegistry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AsyncRead for Connection {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().stream).poll_read(cx, buf)
    }
}

impl AsyncWrite for Connection {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().stream).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().stream).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().stream).poll_shutdown(cx)
    }
}
