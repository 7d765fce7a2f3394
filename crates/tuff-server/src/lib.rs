//! Connection handling and packet dispatch on top of `tuff-mc`.
//!
//! A [`Server`] accepts streams, decodes frames against the phase-scoped
//! packet registry and hands each packet to the [`PacketListener`]s
//! registered for its schema.

pub mod config;
pub mod connection;
pub mod error;
pub mod handlers;
pub mod listener;
pub mod server;
pub mod utils;

pub use config::ServerConfig;
pub use connection::{Connection, SharedRegistry, Transport};
pub use error::ServerError;
pub use handlers::{HandshakeListener, PingListener, StatusRequestListener};
pub use listener::PacketListener;
pub use server::Server;
