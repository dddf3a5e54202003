//! Application configuration module.
//!
//! Manages the TOML config file that declares channels, the EPG source,
//! navigation timing and the playback command.

#[allow(clippy::module_inception)]
mod config;
mod paths;

#[allow(clippy::module_name_repetitions)]
pub use config::{AppConfig, ChannelConfig, PlayerConfig};
pub use paths::{resolve_config_path, resolve_log_path};
