use anyhow::{Context, Result};
use clap::Parser;

use glowmetrics::config::ServiceConfig;

#[derive(Parser, Debug)]
#[clap(name = "glowmetrics", version, about = "GlowMetrics before/after analysis API")]
struct CliArgs {
    /// Address to bind. Overrides `HOST`.
    #[clap(long)]
    pub host: Option<String>,

    /// Port to listen on. Overrides `PORT`.
    #[clap(short, long)]
    pub port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    // Loads `.env` first so RUST_LOG from it applies to the subscriber.
    let mut config = ServiceConfig::from_env().context("Invalid configuration")?;
    glowmetrics::init_tracing();

    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    glowmetrics::run(config).await.context("Server failed")?;
    Ok(())
}
