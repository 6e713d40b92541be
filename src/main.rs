//! Frame Proxy (v1)
//!
//! A CORS-opening forwarding proxy built with Tokio, Axum and reqwest.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │                 FRAME PROXY                  │
//!   Browser               │  ┌─────────┐   ┌──────────┐   ┌──────────┐   │
//!   ──────────────────────┼─▶│  http   │──▶│  proxy   │──▶│ upstream │───┼──▶ Target
//!   GET/POST /proxy       │  │ server  │   │ handler  │   │ (reqwest)│   │    site
//!                         │  └─────────┘   └────┬─────┘   └──────────┘   │
//!   ◀─────────────────────┼───────────────  headers.rs ◀─────────────────┼───
//!   status + body as-is,  │                (denylist out, CORS in)       │
//!   framing headers gone  │                                              │
//!                         │  config · observability · lifecycle          │
//!                         └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use frame_proxy::config::resolve_config;
use frame_proxy::observability::logging;
use frame_proxy::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "frame-proxy")]
#[command(about = "Forwarding proxy that strips framing headers and opens CORS", long_about = None)]
struct Cli {
    /// Optional TOML configuration file.
    #[arg(short, long, env = "FRAME_PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on, keeping the configured host.
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Full bind address; overrides --port.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = resolve_config(cli.config.as_deref(), cli.port, cli.bind.as_deref())?;
    logging::init(&config.observability);

    tracing::info!("frame-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        timeout_secs = config.upstream.timeout_secs,
        max_redirects = config.upstream.max_redirects,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
