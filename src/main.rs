use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod core;
mod monitor;
mod providers;
mod server;

use crate::core::config::{Config, DEFAULT_CONFIG_PATH};
use crate::monitor::{MonitorCache, Poller};
use crate::providers::{CallSource, DashboardSource, RadioidDirectory, UserDirectory};

#[derive(Parser)]
#[command(name = "dvsmon")]
#[command(author, version, about = "JSON API cache for a DMR repeater last-heard dashboard")]
struct Cli {
    /// Path to the JSON config file
    #[arg(default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = Config::load(&cli.config)
        .with_context(|| format!("Expecting a config file at {}", DEFAULT_CONFIG_PATH))?;

    let cache = MonitorCache::new();
    let source: Arc<dyn CallSource> = Arc::new(DashboardSource::new(config.page.clone())?);
    let directory: Arc<dyn UserDirectory> = Arc::new(RadioidDirectory::new(config.users.clone())?);

    let api_cache = cache.clone();
    tokio::spawn(async move {
        if let Err(e) = server::serve(api_cache).await {
            tracing::error!(error = %e, "API server exited");
        }
    });

    Poller::new(cache, source, directory, &config).run().await;
    Ok(())
}
