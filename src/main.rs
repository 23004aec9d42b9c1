//! Book inventory service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ request id ─▶ trace ─▶ capture ─▶ timeout ─▶ router
//!                                              │                     │
//!                                   diagnostic block           /api/books, pages
//!                                        (log)                       │
//!                                                               BookService
//!                                                                    │
//!                                                            BookCollection
//!                                                          (MongoDB / memory)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use book_inventory::config::{apply_env_overrides, finish, read_config, ServiceConfig, StoreBackend};
use book_inventory::lifecycle::{bootstrap, signals, Shutdown};
use book_inventory::observability::{logging, metrics, TracingSink};

#[derive(Parser)]
#[command(name = "book-inventory")]
#[command(about = "Book inventory service", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Use the in-memory store instead of MongoDB.
    #[arg(long)]
    memory: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => read_config(path)?,
        None => ServiceConfig::default(),
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }
    if args.memory {
        config.store.backend = StoreBackend::Memory;
    }
    let config = finish(config)?;

    logging::init(&config.observability)?;
    tracing::info!("book-inventory v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        store = ?config.store.backend,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            if let Err(err) = metrics::init_metrics(addr) {
                tracing::error!(error = %err, "Failed to start metrics endpoint");
            }
        }
    }

    let bind_address = config.listener.bind_address.clone();
    let server = match bootstrap(config, Arc::new(TracingSink)).await {
        Ok(server) => server,
        Err(err) => {
            tracing::error!(error = %err, "Startup failed");
            return Err(err.into());
        }
    };

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        trigger.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
