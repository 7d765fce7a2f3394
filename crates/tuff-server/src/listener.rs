//! Packet listeners.
//!
//! A listener is registered against one packet schema and invoked for every
//! decoded packet of that schema, in registration order.

use std::marker::PhantomData;

use async_trait::async_trait;
use tuff_mc::{Packet, PacketSchema};

use crate::connection::Connection;
use crate::error::ServerError;
use crate::server::Server;

/// Handles decoded packets of type `P`.
///
/// Returning an error ends the connection.
#[async_trait]
pub trait PacketListener<P: PacketSchema>: Send + Sync + 'static {
    /// Handle one packet.
    async fn on_packet(
        &self,
        packet: &P,
        server: &Server,
        conn: &mut Connection,
    ) -> Result<(), ServerError>;
}

/// A listener with its packet type erased, as stored by the server.
#[async_trait]
pub(crate) trait ErasedListener: Send + Sync {
    async fn dispatch(
        &self,
        packet: &dyn Packet,
        server: &Server,
        conn: &mut Connection,
    ) -> Result<(), ServerError>;
}

pub(crate) struct Typed<P, L> {
    listener: L,
    _packet: PhantomData<fn() -> P>,
}

impl<P, L> Typed<P, L> {
    pub(crate) const fn new(listener: L) -> Self {
        Self {
            listener,
            _packet: PhantomData,
        }
    }
}

#[async_trait]
impl<P, L> ErasedListener for Typed<P, L>
where
    P: PacketSchema,
    L: PacketListener<P>,
{
    async fn dispatch(
        &self,
        packet: &dyn Packet,
        server: &Server,
        conn: &mut Connection,
    ) -> Result<(), ServerError> {
        let packet = packet
            .downcast_ref::<P>()
            .ok_or(ServerError::SchemaMismatch(P::SCHEMA))?;

        self.listener.on_packet(packet, server, conn).await
    }
}
