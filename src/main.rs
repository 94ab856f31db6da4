//! Generic HTTP forwarding proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client ──▶ /proxy?url=<target>&<params>
//!                 │
//!                 ▼
//!          ┌─────────────┐   ┌──────────────────┐   ┌───────────────┐
//!          │ URL         │──▶│ HeaderRuleEngine │──▶│ RequestBuilder│
//!          │ validation  │   │ strip + RuleSet  │   │ query, body,  │
//!          └─────────────┘   └──────────────────┘   │ timeout       │
//!                                                    └───────┬───────┘
//!                                                            ▼
//!   Client ◀── relayed response / JSON error ◀──────── Forwarder ──▶ Upstream
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use forward_proxy::http::HttpServer;
use forward_proxy::lifecycle::{resolve_config, Shutdown};
use forward_proxy::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "forward-proxy")]
#[command(about = "HTTP forwarding proxy with per-domain header rules", long_about = None)]
struct Args {
    /// TOML configuration file.
    #[arg(short, long, env = "FORWARD_PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Listening port, overriding the configured bind address port.
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = resolve_config(args.config.as_deref(), args.port)?;

    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?args.config,
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        "forward-proxy starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(
        health = %format!("http://{}/health", local_addr),
        proxy = %format!("http://{}/proxy?url=<target_url>", local_addr),
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
