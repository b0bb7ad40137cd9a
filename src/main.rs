// src/main.rs
use anyhow::{Context, Result};
use clap::Parser;
use gateway_node::{api, GatewayConfig, GatewayNode};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Validator gateway node: registers with a seed node and fans client work
/// out to the validator set.
#[derive(Parser, Debug)]
#[command(name = "gateway-node", version)]
struct Cli {
    /// Seed node address (overrides SEED_NODE_ADDR)
    #[arg(long)]
    seed: Option<String>,

    /// Advertised host (overrides NODE_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Advertised port (overrides NODE_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Local API listen address (overrides API_ADDR)
    #[arg(long)]
    api_addr: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // load .env for local development (if present)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = GatewayConfig::from_env();
    if let Some(seed) = cli.seed {
        config.seed_addr = seed;
    }
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(api_addr) = cli.api_addr {
        config.api_addr = api_addr;
    }

    let report = config.validate();
    report.print_summary();
    if !report.valid {
        eprintln!("Configuration validation failed! Cannot start node.");
        std::process::exit(1);
    }

    let api_addr: SocketAddr = config
        .api_addr
        .parse()
        .with_context(|| format!("invalid API_ADDR '{}'", config.api_addr))?;

    let node = GatewayNode::new(config)?;
    node.start().await;

    let app = api::router(node.clone());
    info!("api listening on {}", api_addr);

    axum::Server::bind(&api_addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("shutdown signal received");
        })
        .await
        .context("api server error")?;

    node.shutdown();
    Ok(())
}
