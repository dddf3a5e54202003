//! Config directory resolution.

use std::path::PathBuf;

use anyhow::{Context, Result};

/// Resolves the config directory.
///
/// - If `dir` is `Some`, returns it unchanged.
/// - Otherwise returns `~/.config/tvsurf`.
fn resolve_config_dir(dir: Option<&PathBuf>) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.clone());
    }

    let home = std::env::var("HOME").context("HOME environment variable is not set")?;
    Ok(PathBuf::from(home).join(".config").join("tvsurf"))
}

/// Resolves the config file path (`{config dir}/config.toml`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined (when `dir` is `None`).
pub fn resolve_config_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    Ok(resolve_config_dir(dir)?.join("config.toml"))
}

/// Resolves the default log file used while the TUI owns the terminal.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined (when `dir` is `None`).
pub fn resolve_log_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    Ok(resolve_config_dir(dir)?.join("tvsurf.log"))
}
