//! smtgate HTTP server
//!
//! Serves `POST /solve` over a z3 process per request.

use anyhow::Result;
use smtgate_server::{api, config::ServerConfig, engine, telemetry};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration first: the log level lives there
    let config = ServerConfig::load()?;

    telemetry::init_tracing(&config)?;
    info!("Loaded configuration: {:?}", config);

    let service = engine::init_service(&config);
    let app = api::create_router(service);

    let addr = config.bind_address();
    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    info!("✓ Server listening on http://{}", addr);
    info!("  Health check: http://{}/health", addr);
    info!("  Solve API: POST http://{}/solve", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
