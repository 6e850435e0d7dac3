//! Ledger Viewer
//!
//! Serves a page showing the latest validated ledger and keeps every open
//! copy of it current by polling the upstream network in the background.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use ledger_client::{LedgerSource, RpcLedgerClient};
use live_server::{HttpServer, LiveUpdater, ViewerRegistry};
use std::{future::Future, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;

use config::ViewerConfig;

/// Live view of the latest validated ledger
#[derive(Parser, Debug)]
#[command(name = "ledger-viewer")]
#[command(about = "Live-updating page for the latest validated ledger", long_about = None)]
struct Args {
    /// Upstream JSON-RPC endpoint
    #[arg(long, default_value_t = ViewerConfig::default().rpc_url)]
    rpc_url: String,

    /// Seconds between ledger refreshes
    #[arg(long, default_value_t = ViewerConfig::default().poll_interval_secs)]
    poll_interval_secs: u64,

    /// HTTP bind address
    #[arg(long, default_value_t = ViewerConfig::default().bind_addr)]
    bind_addr: String,

    /// Upstream request timeout in seconds
    #[arg(long, default_value_t = ViewerConfig::default().request_timeout_secs)]
    request_timeout_secs: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn config(&self) -> ViewerConfig {
        ViewerConfig {
            rpc_url: self.rpc_url.clone(),
            poll_interval_secs: self.poll_interval_secs,
            bind_addr: self.bind_addr.clone(),
            request_timeout_secs: self.request_timeout_secs,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { "debug" } else { args.log_level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    run(args.config(), async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    })
    .await
}

/// Serve until `shutdown` completes. Fails if the server cannot start or dies.
async fn run(config: ViewerConfig, shutdown: impl Future<Output = ()>) -> Result<()> {
    config.validate()?;

    tracing::info!("Starting ledger viewer");
    tracing::debug!("Config: {}", serde_json::to_string(&config)?);

    let client = RpcLedgerClient::new(&config.rpc_url, config.request_timeout())?;
    tracing::info!("  Upstream: {}", client.url());
    tracing::info!("  Poll interval: {}s", config.poll_interval_secs);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    let source: Arc<dyn LedgerSource> = Arc::new(client);
    let viewers = Arc::new(ViewerRegistry::new());

    // Exactly one updater for the life of the process
    let updater = Arc::new(LiveUpdater::new(
        source.clone(),
        viewers.clone(),
        config.poll_interval(),
    ));
    let updater_handle = updater.spawn();

    let mut http_server = tokio::spawn(HttpServer::new(source, viewers).serve(listener));

    tracing::info!("Press Ctrl+C to stop.");

    let result = tokio::select! {
        _ = shutdown => {
            tracing::info!("Shutting down...");
            Ok(())
        }
        exit = &mut http_server => match exit {
            Ok(Ok(())) => Err(anyhow!("HTTP server stopped unexpectedly")),
            Ok(Err(e)) => Err(e.context("HTTP server failed")),
            Err(e) => Err(anyhow!("HTTP server task failed: {}", e)),
        },
    };

    updater_handle.abort();
    http_server.abort();

    tracing::info!("Ledger viewer stopped");

    result
}
