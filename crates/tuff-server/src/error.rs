//! Server error types.

use thiserror::Error;
use tuff_mc::{ProtocolError, SchemaId};

/// Errors that end a connection's processing loop.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Decoding or encoding a packet failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A listener rejected a packet.
    #[error("Listener for {schema} failed: {message}")]
    Listener {
        /// The schema of the packet being handled.
        schema: SchemaId,
        /// Why the listener failed.
        message: String,
    },

    /// A listener was registered under a schema tag its packet type does
    /// not carry.
    #[error("Listener registered for {0} received a different packet type")]
    SchemaMismatch(SchemaId),
}

impl ServerError {
    /// Create a listener error.
    pub fn listener(schema: SchemaId, message: impl Into<String>) -> Self {
        Self::Listener {
            schema,
            message: message.into(),
        }
    }

    /// Returns `true` if the peer simply closed the stream between frames.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        matches!(self, Self::Protocol(e) if e.is_eof())
    }
}
