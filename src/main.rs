//! Entry point of the advertisement admin backend
//!
//! Serves the order list over an in-memory store.

use advertise::config::{AdminConfig, init_tracing};
use advertise::entities::order::OrderDescriptor;
use advertise::server::ServerBuilder;
use advertise::storage::InMemoryOrderStore;
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file; built-in defaults when omitted
    #[arg(short, long, env = "ADVERTISE_ADMIN_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter, overrides `logging.filter` (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AdminConfig::from_yaml_file(path)?,
        None => AdminConfig::default(),
    }
    .with_env_overrides();
    if let Some(level) = args.log_level {
        config.logging.filter = level;
    }

    init_tracing(&config.logging);
    tracing::info!(config = ?args.config, "starting advertise-admin");

    let addr = config.server.socket_addr()?;
    let store = Arc::new(InMemoryOrderStore::new());
    let orders = OrderDescriptor::from_config(&config.access, store)?;

    ServerBuilder::new()
        .register_entity(orders)
        .serve(addr)
        .await
        .context("server stopped with an error")
}
