//! Status protocol packets.
//!
//! The status protocol is used by clients to query server information
//! without joining.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::types::Json;

crate::packet! {
    /// Status Request packet (client -> server, `0x00`).
    ///
    /// This is an empty packet that requests server status.
    pub struct StatusRequest as "status_request" {}
}

crate::packet! {
    /// Status Response packet (server -> client, `0x00`).
    ///
    /// Contains a JSON object with server information.
    pub struct StatusResponse as "status_response" {
        /// Server status document.
        pub response: Json<StatusJson>,
    }
}

crate::packet! {
    /// Ping packet (client -> server, `0x01`).
    ///
    /// Client sends a timestamp, server echoes it back.
    pub struct Ping as "ping" {
        /// Arbitrary payload (usually a timestamp).
        pub payload: i64,
    }
}

crate::packet! {
    /// Pong packet (server -> client, `0x01`).
    pub struct Pong as "pong" {
        /// The payload from the ping packet.
        pub payload: i64,
    }
}

/// The server list document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusJson {
    /// Game version and protocol number.
    pub version: StatusVersion,
    /// Player counts.
    pub players: StatusPlayers,
    /// Message of the day, as a chat component.
    pub description: Value,
    /// Base64 PNG data URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
}

/// Version block of the status document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusVersion {
    /// Human-readable version name.
    pub name: String,
    /// Protocol version number.
    pub protocol: i32,
}

/// Players block of the status document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPlayers {
    /// Maximum player count.
    pub max: i32,
    /// Current player count.
    pub online: i32,
    /// Some of the online players.
    #[serde(default)]
    pub sample: Vec<PlayerSample>,
}

/// One entry of the player sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSample {
    /// Player name.
    pub name: String,
    /// Player UUID, in hyphenated or simple form. A sample id that is not
    /// a UUID fails the whole document with [`ProtocolError::Json`].
    ///
    /// [`ProtocolError::Json`]: crate::ProtocolError::Json
    pub id: Uuid,
}

impl Ping {
    /// Create a new ping with the given payload.
    #[must_use]
    pub const fn new(payload: i64) -> Self {
        Self { payload }
    }
}

impl Pong {
    /// Create a new pong with the given payload.
    #[must_use]
    pub const fn new(payload: i64) -> Self {
        Self { payload }
    }
}

impl StatusResponse {
    /// Create a new status response from a status document.
    #[must_use]
    pub const fn new(status: StatusJson) -> Self {
        Self {
            response: Json(status),
        }
    }
}
