//! proxys: rate-limited JSON-RPC reverse proxy with backend failover.
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                   PROXYS                     │
//!                      │                                              │
//!   Client request     │  ┌──────────┐   ┌───────────┐   ┌─────────┐  │
//!   ───────────────────┼─▶│ listener │──▶│ admission │──▶│ forward │──┼──▶ active
//!                      │  └──────────┘   │  (bucket) │   │ engine  │  │    backend
//!                      │                 └───────────┘   └────┬────┘  │
//!                      │                                      │failure│
//!                      │                                      ▼       │
//!                      │  ┌──────────────┐  rotate   ┌──────────────┐ │
//!                      │  │   failure    │◀──────────│    error     │ │
//!                      │  │   monitor    │  window   │    window    │ │
//!                      │  └──────────────┘           └──────────────┘ │
//!                      │                                              │
//!                      │  background: 1 s bucket refill,              │
//!                      │              30 s failure evaluation         │
//!                      └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use proxys::config::{self, ProxyConfig};
use proxys::http::HttpServer;
use proxys::lifecycle::{signals, Shutdown};
use proxys::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "proxys")]
#[command(
    about = "Forward JSON-RPC requests to a pool of upstream nodes, rotating away from failing ones",
    long_about = None
)]
struct Cli {
    /// File containing newline-delimited backend base URLs
    #[arg(long, default_value = "urls")]
    file: PathBuf,

    /// Listening TCP port
    #[arg(long, default_value_t = 26657)]
    port: u16,

    /// Maximum admitted requests per second
    #[arg(long, default_value_t = 10)]
    limit: u32,

    /// Optional TOML file with advanced settings (timeouts, failover cadence)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => ProxyConfig::default(),
    };
    config.listener.port = cli.port;
    config.rate_limit.requests_per_second = cli.limit;

    logging::init(&config.observability.log_level);

    let backends = config::read_backends(&cli.file)?;
    tracing::info!(
        file = %cli.file.display(),
        backends = backends.len(),
        limit = config.rate_limit.requests_per_second,
        "Backend pool loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_exporter(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    // Bind before spawning anything; an unusable port must be fatal
    // before any request is served.
    let listener = TcpListener::bind(config.listener.socket_addr()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            signals::wait_for_signal().await;
            shutdown.trigger();
        });
    }

    let server = HttpServer::new(config, backends);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
