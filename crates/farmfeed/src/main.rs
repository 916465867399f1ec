//! Farmfeed daemon - AI proxy routes for the farm community feed

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use farmfeed::config::{Config, Credentials};
use farmfeed::error::Result;
use farmfeed::proxy::ProxyServer;

/// Farmfeed - summarization, advice and speech proxies for a farm community feed
#[derive(Parser)]
#[command(name = "farmfeed")]
#[command(about = "Summarization, advice and speech proxies for a farm community feed")]
#[command(version)]
pub struct Cli {
    /// Path to config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Override the listen address from the config file
    #[arg(long, short = 'l', global = true)]
    pub listen: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the proxy server (default command)
    #[command(name = "serve")]
    Serve,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    match cli.command {
        None | Some(Command::Serve) => serve(cli.config, cli.listen).await,
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,farmfeed=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn serve(config_path: Option<PathBuf>, listen: Option<String>) -> Result<()> {
    tracing::info!("Starting Farmfeed daemon");

    let mut config = Config::load(config_path.as_deref())?;
    config.apply_env_overrides();
    if let Some(addr) = listen {
        config.server.listen_addr = addr;
    }
    tracing::debug!("Config loaded: {:?}", config);

    let credentials = Credentials::from_env(&config);
    tracing::debug!("Credentials resolved: {:?}", credentials);

    ProxyServer::new(config, credentials).serve().await?;

    tracing::info!("Farmfeed daemon stopped");
    Ok(())
}
