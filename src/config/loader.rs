//! Configuration loading from file system

use std::path::Path;
use tracing::{info, instrument, warn};

use super::defaults::DEFAULT_CONFIG_PATH;
use super::types::{expand_path, Config};
use crate::error::ResultExt;

/// Load configuration from `path`, or from the default location when None.
///
/// Returns Config::default() if the file is missing, unreadable or invalid.
#[instrument(name = "load_config")]
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = match path {
        Some(path) => expand_path(&path.to_string_lossy()),
        None => expand_path(DEFAULT_CONFIG_PATH),
    };

    if !config_path.exists() {
        info!(path = %config_path.display(), "Config file not found, using defaults");
        return Config::default();
    }

    let Some(contents) = std::fs::read_to_string(&config_path).warn_on_err() else {
        return Config::default();
    };

    match serde_json::from_str::<Config>(&contents) {
        Ok(config) => {
            info!(path = %config_path.display(), "Successfully loaded config");
            config
        }
        Err(e) => {
            warn!(
                error = %e,
                path = %config_path.display(),
                "Failed to parse config JSON, using defaults"
            );
            Config::default()
        }
    }
}
