mod config;
mod context;
mod encryption;
mod error;
mod forwarding;
mod handlers;
mod keep_alive;
mod placeholders;
mod session;

use config::ServerConfig;
use context::ServerContext;
use session::Session;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

const DEFAULT_CONFIG_PATH: &str = "config/server.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting limbo server...");

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let settings = ServerConfig::load(&path)?.into_settings()?;
    info!(
        "Config loaded: bind={}:{}, max_players={}, versions={}",
        settings.bind,
        settings.port,
        settings.max_players,
        settings
            .supported_versions
            .iter()
            .map(|v| v.number().to_string())
            .collect::<Vec<_>>()
            .join(",")
    );

    let ctx = Arc::new(ServerContext::new(settings)?);
    info!(
        "World ready: {} spawn chunks around {:?}",
        ctx.spawn_chunks.columns().len(),
        ctx.spawn_chunks.center()
    );

    let addr = format!("{}:{}", ctx.settings.bind, ctx.settings.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    tokio::select! {
        _ = accept_loop(listener, ctx) => {
            error!("Accept loop exited unexpectedly");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    Ok(())
}

async fn accept_loop(listener: TcpListener, ctx: Arc<ServerContext>) {
    loop {
        match listener.accept().await {
            Ok((socket, peer)) => {
                debug!("New connection from {}", peer);
                if let Err(e) = socket.set_nodelay(true) {
                    debug!("Could not set TCP_NODELAY for {}: {}", peer, e);
                }
                let ctx = ctx.clone();
                tokio::spawn(async move {
                    Session::new(ctx, socket, peer).run().await;
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
