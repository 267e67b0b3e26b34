//! Serve command implementation

use crate::api;
use crate::config::Config;
use crate::context::AppContext;
use crate::error::Result;
use std::net::SocketAddr;

/// Start the HTTP API. `bind` overrides `server.bind`.
pub async fn cmd_serve(config: &Config, bind: Option<SocketAddr>) -> Result<()> {
    let addr = match bind {
        Some(addr) => addr,
        None => config.bind_addr()?,
    };

    let ctx = AppContext::initialize(config).await?;
    api::serve(ctx, &config.server, addr).await
}
