//! Loads the static YAML config file and resolves the application identifier
//! from file or environment.

use std::fs;
use std::path::Path;

use anyhow::Result;
use tracing::{error, info};

use crate::config::Config;

/// Environment variable consulted when the config file carries no `app_id`.
pub const APP_ID_ENV: &str = "GALLERY_APP_ID";

/// Fully resolved runtime configuration: endpoints plus a concrete app id.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub gallery_endpoint: String,
    pub upload_endpoint: String,
    pub app_id: String,
}

/// Load a YAML config file and resolve it. Missing endpoint keys fall back to
/// the built-in defaults; a missing `app_id` falls back to `GALLERY_APP_ID`.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ResolvedConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let content = fs::read_to_string(path_ref).map_err(|e| {
        error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
        anyhow::anyhow!("Failed to read config file {:?}: {}", path_ref, e)
    })?;

    let config: Config = serde_yaml::from_str(&content).map_err(|e| {
        error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
        anyhow::anyhow!("Failed to parse config YAML: {e}")
    })?;
    config.trace_loaded();

    resolve(config)
}

/// Resolve a [`Config`] (possibly the built-in default) into a
/// [`ResolvedConfig`], sourcing the app id from the environment if the file
/// did not provide one.
pub fn resolve(config: Config) -> Result<ResolvedConfig> {
    let app_id = match config.app_id {
        Some(id) => id,
        None => std::env::var(APP_ID_ENV).map_err(|e| {
            error!(error = ?e, "No app_id in config and {APP_ID_ENV} not set");
            anyhow::anyhow!(
                "no app_id configured: set app_id in the config file or the {APP_ID_ENV} environment variable"
            )
        })?,
    };
    Ok(ResolvedConfig {
        gallery_endpoint: config.gallery_endpoint,
        upload_endpoint: config.upload_endpoint,
        app_id,
    })
}
