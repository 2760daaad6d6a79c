//! Client configuration
//!
//! Stored as JSON. Missing fields take their defaults, so an old config
//! file keeps working when new options are added.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::error::{CoreError, CoreResult};

/// Default game server WebSocket endpoint
pub const DEFAULT_SERVER_URL: &str = "ws://localhost:3001/ws";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// WebSocket endpoint of the game server
    pub server_url: Url,
    /// Identity sent with every move and social action
    pub actor: String,
    /// Local clock tick period in milliseconds
    pub tick_interval_ms: u64,
    /// `tracing` filter directive, overridden by `RUST_LOG`
    pub log_filter: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            server_url: Url::parse(DEFAULT_SERVER_URL).expect("default server URL is valid"),
            actor: "anonymous".to_string(),
            tick_interval_ms: 1000,
            log_filter: "info".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if !matches!(self.server_url.scheme(), "ws" | "wss") {
            return Err(CoreError::InvalidConfig {
                message: format!(
                    "server_url must use ws:// or wss://, got {}",
                    self.server_url
                ),
            });
        }
        if self.actor.trim().is_empty() {
            return Err(CoreError::InvalidConfig {
                message: "actor must not be empty".to_string(),
            });
        }
        if self.tick_interval_ms == 0 {
            return Err(CoreError::InvalidConfig {
                message: "tick_interval_ms must be positive".to_string(),
            });
        }
        Ok(())
    }
}
