//! The `geodash serve` command: preload the caches and run the HTTP backend.

use clap::Args;
use geodash_core::{Config, Geodash};
use std::sync::Arc;

use crate::server::{self, AppState};

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind (overrides `[server] host`)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides `[server] port`)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Skip the startup download; the raster is then fetched on first request
    #[arg(long)]
    pub no_preload: bool,
}

/// Execute the serve command.
pub async fn execute(args: ServeArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let app = Geodash::new(config)?;
    if app.chat_enabled() {
        tracing::info!(model = %app.config().llm.model, "Chat enabled");
    } else {
        tracing::info!("Chat disabled; /api/chat will return the fallback reply");
    }
    if args.no_preload {
        tracing::info!("Skipping startup download");
    } else {
        tracing::info!("Loading CSV and raster...");
        app.preload().await;
    }

    server::serve(AppState { app: Arc::new(app) }, &addr).await
}
