//! Default listeners for the handshake and status phases.

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;
use tuff_mc::packets::status::{StatusJson, StatusPlayers, StatusVersion};
use tuff_mc::packets::{Handshake, Ping, Pong, StatusRequest, StatusResponse};
use tuff_mc::{PacketSchema, Phase};

use crate::connection::Connection;
use crate::error::ServerError;
use crate::listener::PacketListener;
use crate::server::Server;

/// Moves the connection to the phase the client asked for.
#[derive(Debug, Clone, Copy, Default)]
pub struct HandshakeListener;

#[async_trait]
impl PacketListener<Handshake> for HandshakeListener {
    async fn on_packet(
        &self,
        packet: &Handshake,
        _server: &Server,
        conn: &mut Connection,
    ) -> Result<(), ServerError> {
        debug!(
            protocol = packet.protocol_version.0,
            address = %packet.server_address,
            port = packet.server_port,
            next_state = %packet.next_state,
            "Received handshake"
        );

        match packet.next_state {
            Phase::Status | Phase::Login => {
                conn.set_phase(packet.next_state);
                Ok(())
            }
            other => Err(ServerError::listener(
                Handshake::SCHEMA,
                format!("cannot switch to {other} from a handshake"),
            )),
        }
    }
}

/// Answers a status request with the server list document.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusRequestListener;

#[async_trait]
impl PacketListener<StatusRequest> for StatusRequestListener {
    async fn on_packet(
        &self,
        _packet: &StatusRequest,
        server: &Server,
        conn: &mut Connection,
    ) -> Result<(), ServerError> {
        debug!("Received status request");

        let config = server.config();
        let status = StatusJson {
            version: StatusVersion {
                name: config.version_name.clone(),
                protocol: config.protocol_version,
            },
            players: StatusPlayers {
                max: i32::try_from(config.max_players).unwrap_or(i32::MAX),
                online: 0,
                sample: Vec::new(),
            },
            description: json!({ "text": config.motd }),
            favicon: None,
        };

        conn.write_packet(&StatusResponse::new(status)).await?;

        debug!("Sent status response");

        Ok(())
    }
}

/// Echoes a ping payload back as a pong.
#[derive(Debug, Clone, Copy, Default)]
pub struct PingListener;

#[async_trait]
impl PacketListener<Ping> for PingListener {
    async fn on_packet(
        &self,
        packet: &Ping,
        _server: &Server,
        conn: &mut Connection,
    ) -> Result<(), ServerError> {
        debug!(payload = packet.payload, "Received ping");

        conn.write_packet(&Pong::new(packet.payload)).await?;

        debug!("Sent pong");

        Ok(())
    }
}
