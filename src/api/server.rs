//! Server lifecycle: bind, serve until Ctrl-C, close the pool.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;

use crate::api::router::build_router;
use crate::config::ServerConfig;
use crate::context::AppContext;
use crate::error::Result;

/// Serve the API on `addr` until a shutdown signal arrives
pub async fn serve(ctx: AppContext, server: &ServerConfig, addr: SocketAddr) -> Result<()> {
    let db = ctx.db.clone();
    let router = build_router(ctx, server)?;

    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}/api/", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped, closing database");
    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
