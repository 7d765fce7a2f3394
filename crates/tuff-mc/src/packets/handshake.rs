//! Handshake packet definitions.
//!
//! The handshake is the first packet sent by the client and determines
//! whether this is a status ping or a login attempt.

use crate::state::Phase;
use crate::types::VarInt;

crate::packet! {
    /// Handshake packet sent by the client (serverbound, `0x00`, handshaking).
    ///
    /// This is always the first packet in a connection.
    pub struct Handshake as "handshake" {
        /// The protocol version the client is using.
        pub protocol_version: VarInt,
        /// The server address the client connected to.
        pub server_address: String,
        /// The server port the client connected to.
        pub server_port: u16,
        /// The phase to switch to: Status (1) or Login (2).
        pub next_state: Phase,
    }
}
