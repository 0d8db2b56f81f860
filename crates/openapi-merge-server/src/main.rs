//! Serves the aggregated OpenAPI document described by a configuration file.

use clap::Parser;
use openapi_merge_server::Config;
use openapi_merge_server::config::DEFAULT_CONFIG_FILE;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "openapi-merge", version, about)]
struct Cli {
    /// Configuration file (.toml, or YAML/JSON otherwise)
    #[arg(short, long, env = "CONFIG_FILE", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "openapi_merge_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config).inspect_err(|err| {
        tracing::error!(error = %err, "Failed to load configuration");
    })?;
    tracing::debug!(config = ?config, path = %cli.config.display(), "Configuration loaded");

    openapi_merge_server::serve(config).await
}
