mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use studiocal_core::config::StudioCalConfig;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::state::AppState;

/// Initialize logging with environment-based configuration
fn init_logging() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set up logging: {e}"))?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let config = StudioCalConfig::load()?;
    let state = AppState::new(&config)?;
    let app = routes::app(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.server_port));
    info!("studiocal-server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
