use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tuff_server::{Server, ServerConfig};

/// Tuff: a server-list responder speaking the handshake and status phases
/// of the Minecraft protocol.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let config = ServerConfig::from_env()?;
    let listener = TcpListener::bind(&config.addr).await?;

    info!(
        version = %config.version_name,
        protocol = config.protocol_version,
        "Listening on {}",
        config.addr
    );

    Arc::new(Server::new(config)).run(listener).await;

    Ok(())
}
