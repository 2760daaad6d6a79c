//! Config persistence
//!
//! Loads and saves [`ClientConfig`] as `config.json` in the user's
//! configuration directory.
//!
//! # Error Handling
//!
//! - [`load_config`] reports what went wrong so the caller can log it once
//!   logging is set up
//! - [`load_or_default`] falls back to defaults and logs the reason

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::{info, warn};

use crate::core::config::ClientConfig;
use crate::core::error::CoreResult;

/// Config filename
const CONFIG_FILENAME: &str = "config.json";

/// Path to `config.json` in the user's configuration directory
///
/// E.g. `~/.config/chess-session/config.json` on Linux.
/// Falls back to a local `config.json` if no home directory can be found.
pub fn config_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("org", "chess-session", "chess-session") {
        proj_dirs.config_dir().join(CONFIG_FILENAME)
    } else {
        PathBuf::from(CONFIG_FILENAME)
    }
}

/// Read the config at `path`; `Ok(None)` when no file exists
pub fn load_config(path: &Path) -> CoreResult<Option<ClientConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path)?;
    let config: ClientConfig = serde_json::from_str(&contents)?;
    config.validate()?;
    Ok(Some(config))
}

/// Read the config at `path`, using defaults if it is missing or invalid
pub fn load_or_default(path: &Path) -> ClientConfig {
    match load_config(path) {
        Ok(Some(config)) => {
            info!("[CONFIG] Loaded config from {:?}", path);
            config
        }
        Ok(None) => {
            info!("[CONFIG] No config file found at {:?}. Using defaults.", path);
            ClientConfig::default()
        }
        Err(e) => {
            warn!(
                "[CONFIG] Failed to load config at {:?}: {}. Using defaults.",
                path, e
            );
            ClientConfig::default()
        }
    }
}

/// Write `config` to `path`, creating parent directories as needed
pub fn save_config(path: &Path, config: &ClientConfig) -> CoreResult<()> {
    config.validate()?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)?;
    info!("[CONFIG] Saved config to {:?}", path);
    Ok(())
}
