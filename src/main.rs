use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tryon_gateway::{config, server};

/// Builds the log filter, accepting plain levels and `target=level` directives
fn build_filter(directives: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directives).map_err(|_| {
        anyhow::anyhow!(
            "Invalid log level: '{}'. Valid levels: error, warn, info, debug, trace",
            directives
        )
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration is loaded before logging is set up
    let config = match config::load().await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // RUST_LOG overrides the configured level
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| config.server.logs.level.clone());

    let filter = match build_filter(&log_level) {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    tracing_subscriber::fmt().with_env_filter(filter).json().init();

    info!("Starting try-on gateway with log level: {}", log_level);
    info!(
        "Catalog at {}, uploads in {}",
        config.catalog.database_path, config.server.upload_dir
    );

    server::run(config).await?;

    Ok(())
}
