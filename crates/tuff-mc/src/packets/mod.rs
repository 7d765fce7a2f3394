//! Protocol packets.
//!
//! Packets are organized by connection phase:
//! - Handshake: Initial connection state
//! - Status: Server list ping
//!
//! Login and play schemas can be declared with [`packet!`](crate::packet)
//! and bound at runtime through the registry.

mod macros;
pub mod handshake;
pub mod status;
pub mod traits;

pub use handshake::Handshake;
pub use status::{Ping, Pong, StatusRequest, StatusResponse};
