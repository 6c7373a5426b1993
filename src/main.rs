//! Caching Forward Proxy
//!
//! # Architecture Overview
//!
//! ```text
//!   Client ──▶ net::listener ──▶ http::server ──spawn──▶ http::pipeline
//!                                                          │
//!                                  ┌───── lookup ──────────┤
//!                                  ▼                       │ miss
//!                            cache::ObjectCache            ▼
//!                                  ▲              url → headers → origin
//!                                  └───── store ◀── relay (≤ max object size)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use forward_proxy::cache::ObjectCache;
use forward_proxy::config::{load_config, ProxyConfig};
use forward_proxy::lifecycle::{shutdown_on_ctrl_c, Shutdown};
use forward_proxy::net::Listener;
use forward_proxy::observability::{logging, metrics};
use forward_proxy::ProxyServer;

#[derive(Parser)]
#[command(name = "forward-proxy")]
#[command(about = "Caching HTTP/1.0 forward proxy", long_about = None)]
struct Cli {
    /// TCP port to listen on
    port: u16,

    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    logging::init(&config.observability.log_level);
    tracing::info!("forward-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        port = cli.port,
        cache_enabled = config.cache.enabled,
        cache_slots = config.cache.slots,
        max_object_size = config.cache.max_object_size,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = Listener::bind(&config.listener, cli.port).await?;
    let cache = Arc::new(ObjectCache::new(config.cache.slots, config.cache.max_object_size));

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(shutdown_on_ctrl_c(shutdown));

    ProxyServer::new(&config, cache).run(listener, receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
