//! Connection acceptance and packet dispatch.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tokio::net::TcpListener;
use tracing::{Instrument, debug, error, info_span, warn};
use tuff_mc::packets::{Handshake, Ping, StatusRequest};
use tuff_mc::{Direction, Packet, PacketRegistry, PacketSchema, Phase, Result, Schema, SchemaId};

use crate::config::ServerConfig;
use crate::connection::{Connection, SharedRegistry, Transport};
use crate::error::ServerError;
use crate::handlers::{HandshakeListener, PingListener, StatusRequestListener};
use crate::listener::{ErasedListener, PacketListener, Typed};

type ListenerList = Vec<Arc<dyn ErasedListener>>;

/// A protocol server: owns the packet registry and the listeners, and runs
/// one decode-dispatch loop per accepted connection.
///
/// Listeners for a packet run one after another inside the connection's
/// loop, so a phase change made by a listener applies to the next frame.
pub struct Server {
    config: ServerConfig,
    registry: SharedRegistry,
    listeners: RwLock<HashMap<SchemaId, ListenerList>>,
    session_counter: AtomicUsize,
}

impl Server {
    /// Create a server with the handshake/status bindings and listeners.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        let server = Self::with_registry(config, PacketRegistry::standard());

        server.register_listener::<Handshake, _>(HandshakeListener);
        server.register_listener::<StatusRequest, _>(StatusRequestListener);
        server.register_listener::<Ping, _>(PingListener);

        server
    }

    /// Create a server around a registry, with no listeners.
    #[must_use]
    pub fn with_registry(config: ServerConfig, registry: PacketRegistry) -> Self {
        Self {
            config,
            registry: Arc::new(RwLock::new(registry)),
            listeners: RwLock::new(HashMap::new()),
            session_counter: AtomicUsize::new(0),
        }
    }

    /// The server's settings.
    #[must_use]
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Bind a packet id in the server's registry.
    ///
    /// Returns the schema previously bound to that id, if any.
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

    /// The schema bound to `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is bound.
    pub fn packet_schema(&self, phase: Phase, direction: Direction, id: i32) -> Result<Schema> {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .packet_schema(phase, direction, id)
    }

    /// The id bound to `schema` in a phase.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema is unbound.
    pub fn packet_id(&self, phase: Phase, schema: SchemaId) -> Result<i32> {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .packet_id(phase, schema)
    }

    /// Append a listener for packets of type `P`.
    pub fn register_listener<P, L>(&self, listener: L)
    where
        P: PacketSchema,
        L: PacketListener<P>,
    {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(P::SCHEMA)
            .or_default()
            .push(Arc::new(Typed::<P, L>::new(listener)));
    }

    /// Number of listeners registered for a schema.
    #[must_use]
    pub fn listener_count(&self, schema: SchemaId) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&schema)
            .map_or(0, Vec::len)
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self: Arc<Self>, listener: TcpListener) {
        loop {
            match listener.accept().await {
                Ok((client, client_addr)) => {
                    let server = Arc::clone(&self);
                    tokio::spawn(async move {
                        server.handle_connection(client, client_addr).await;
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {e}");
                }
            }
        }
    }

    /// Handle a single client connection until it closes or fails.
    pub async fn handle_connection(&self, stream: impl Transport + 'static, client_addr: SocketAddr) {
        let session_id = self.session_counter.fetch_add(1, Ordering::SeqCst);

        async {
            let mut conn = Connection::new(session_id, stream, Arc::clone(&self.registry));

            debug!("Accepted");

            if let Err(e) = self.process(&mut conn).await {
                if e.is_eof() {
                    debug!(phase = %conn.phase(), "Connection closed by peer");
                } else {
                    warn!(phase = %conn.phase(), "Dropping connection: {e}");
                }
            }

            if let Err(e) = conn.close().await {
                debug!("Failed to close connection: {e}");
            }
        }
        .instrument(info_span!(
            "conn",
            sid = session_id,
            ip = %client_addr.ip(),
            port = client_addr.port()
        ))
        .await;
    }

    /// Decode packets in arrival order and dispatch each one. Only returns
    /// on error.
    async fn process(&self, conn: &mut Connection) -> std::result::Result<(), ServerError> {
        loop {
            let packet = conn.read_packet(Direction::Serverbound).await?;

            debug!(phase = %conn.phase(), schema = %packet.schema(), "Received packet");

            self.dispatch(packet.as_ref(), conn).await?;
        }
    }

    /// Invoke every listener registered for the packet's schema, in
    /// registration order.
    async fn dispatch(
        &self,
        packet: &dyn Packet,
        conn: &mut Connection,
    ) -> std::result::Result<(), ServerError> {
        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&packet.schema())
            .cloned()
            .unwrap_or_default();

        if listeners.is_empty() {
            debug!(schema = %packet.schema(), "No listeners registered");
        }

        for listener in listeners {
            listener.dispatch(packet, self, conn).await?;
        }

        Ok(())
    }
}
