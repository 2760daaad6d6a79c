//! Core module - configuration and application infrastructure
//!
//! - [`ClientConfig`] - server address, acting player and clock cadence
//! - [`settings_persistence`] - load/save of the config file in the user's
//!   configuration directory
//! - [`CoreError`] - failures of the above

pub mod config;
pub mod error;
pub mod settings_persistence;

pub use config::ClientConfig;
pub use error::{CoreError, CoreResult};
pub use settings_persistence::{config_path, load_config, load_or_default, save_config};
