mod types;

pub use types::*;

use crate::Result;
use std::env;
use tracing::debug;

pub async fn load() -> Result<Config> {
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

    debug!("Loading configuration from: {}", config_path);

    let config_str = tokio::fs::read_to_string(&config_path).await?;
    let mut config = parse(&config_str)?;
    apply_env_overrides(&mut config, |key| env::var(key).ok());

    Ok(config)
}

pub fn parse(config_str: &str) -> Result<Config> {
    let config: Config = serde_yaml::from_str(config_str)?;
    Ok(config)
}

/// Applies `CATALOG_DB_PATH`, `TRYON_MODEL` and `HF_TOKEN` on top of the file values.
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(path) = lookup("CATALOG_DB_PATH") {
        config.catalog.database_path = path;
    }
    if let Some(model) = lookup("TRYON_MODEL") {
        config.inference.model = model;
    }
    if let Some(token) = lookup("HF_TOKEN") {
        config.inference.token = Some(token);
    }
}
