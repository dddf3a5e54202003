//! `AppConfig` struct and TOML read/write.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use url::Url;

/// Top-level application configuration.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// EPG source settings.
    #[serde(default)]
    pub epg: EpgConfig,
    /// Navigation timing settings.
    #[serde(default)]
    pub navigation: NavigationConfig,
    /// Playback command settings.
    #[serde(default)]
    pub player: PlayerConfig,
    /// Channel declarations, in selection order.
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
}

/// EPG source configuration.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EpgConfig {
    /// URL of the static EPG JSON document.
    pub url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for EpgConfig {
    fn default() -> Self {
        Self {
            url: String::from("http://localhost:8080/epg.json"),
            timeout_secs: 10,
        }
    }
}

/// Navigation configuration.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NavigationConfig {
    /// Inactivity period before the channel list hides itself.
    pub auto_hide_ms: u64,
    /// Commit the first channel to playback at startup.
    pub autoplay: bool,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            auto_hide_ms: 4000,
            autoplay: true,
        }
    }
}

/// Playback command configuration.
///
/// Without a `command`, stream URIs are handed to the OS default opener.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Player executable (e.g. `mpv`).
    pub command: Option<String>,
    /// Arguments placed before the stream URI.
    pub args: Vec<String>,
}

/// A single channel declaration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Channel identifier, used as the EPG key.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Stream source URI.
    pub src: String,
    /// Initial program-info text, replaced once the EPG loads.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub info: String,
}

impl AppConfig {
    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Saves config to a TOML file, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation or file write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("failed to serialize config to TOML")?;
        std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
    }

    /// Starter config written by `tvsurf init`.
    #[must_use]
    pub fn sample() -> Self {
        let channels = (1..=3)
            .map(|n| ChannelConfig {
                id: format!("ch{n}"),
                name: format!("Channel {n}"),
                src: format!("http://localhost:8080/streams/ch{n}.m3u8"),
                info: String::new(),
            })
            .collect();

        Self {
            channels,
            ..Self::default()
        }
    }

    /// Checks that the channel declarations are usable.
    ///
    /// # Errors
    ///
    /// Returns an error if no channels are declared or an id repeats.
    pub fn validate(&self) -> Result<()> {
        if self.channels.is_empty() {
            bail!("No channels are defined in the config. At least one channel is required.");
        }

        let mut seen = HashSet::new();
        for channel in &self.channels {
            if !seen.insert(channel.id.as_str()) {
                bail!("duplicate channel id {:?} in config", channel.id);
            }
        }
        Ok(())
    }

    /// Parses the configured EPG URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn epg_url(&self) -> Result<Url> {
        Url::parse(&self.epg.url).with_context(|| format!("invalid EPG url {:?}", self.epg.url))
    }

    /// EPG request timeout.
    #[must_use]
    pub const fn epg_timeout(&self) -> Duration {
        Duration::from_secs(self.epg.timeout_secs)
    }

    /// Channel list auto-hide delay.
    #[must_use]
    pub const fn auto_hide_delay(&self) -> Duration {
        Duration::from_millis(self.navigation.auto_hide_ms)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;

    #[test]
    fn test_default_config() {
        // Arrange & Act
        let config = AppConfig::default();

        // Assert
        assert!(config.channels.is_empty());
        assert_eq!(config.auto_hide_delay(), Duration::from_millis(4000));
        assert!(config.navigation.autoplay);
        assert_eq!(config.player.command, None);
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        // Arrange
        let config = AppConfig {
            player: PlayerConfig {
                command: Some(String::from("mpv")),
                args: vec![String::from("--force-window=immediate")],
            },
            ..AppConfig::sample()
        };

        // Act
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();

        // Assert
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_parse_channel_declarations() {
        // Arrange
        let toml_str = r#"
            [epg]
            url = "http://example.com/epg.json"

            [navigation]
            auto_hide_ms = 2500

            [[channels]]
            id = "ch1"
            name = "News 24"
            src = "http://example.com/ch1.m3u8"
            info = "Loading..."

            [[channels]]
            id = "ch2"
            name = "Movies"
            src = "http://example.com/ch2.m3u8"
        "#;

        // Act
        let config: AppConfig = toml::from_str(toml_str).unwrap();

        // Assert
        assert_eq!(config.channels.len(), 2);
        assert_eq!(config.channels[0].info, "Loading...");
        assert_eq!(config.channels[1].info, "");
        assert_eq!(config.auto_hide_delay(), Duration::from_millis(2500));
        assert!(config.navigation.autoplay);
        assert_eq!(config.epg_timeout(), Duration::from_secs(10));
        assert_eq!(
            config.epg_url().unwrap().as_str(),
            "http://example.com/epg.json"
        );
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        // Arrange
        let path = Path::new("/tmp/tvsurf_test_nonexistent_config.toml");

        // Act
        let config = AppConfig::load(path).unwrap();

        // Assert
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = AppConfig::sample();

        // Act
        config.save(&path).unwrap();
        let loaded = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_invalid_toml() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[[channels]]\nid = ").unwrap();

        // Act
        let result = AppConfig::load(&path);

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_requires_channels() {
        // Arrange
        let config = AppConfig::default();

        // Act
        let err = config.validate().unwrap_err();

        // Assert
        assert!(err.to_string().contains("No channels are defined"));
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        // Arrange
        let mut config = AppConfig::sample();
        config.channels[1].id = String::from("ch1");

        // Act
        let err = config.validate().unwrap_err();

        // Assert
        assert!(err.to_string().contains("duplicate channel id"));
    }

    #[test]
    fn test_validate_sample() {
        // Arrange & Act & Assert
        assert!(AppConfig::sample().validate().is_ok());
    }

    #[test]
    fn test_invalid_epg_url() {
        // Arrange
        let mut config = AppConfig::default();
        config.epg.url = String::from("not a url");

        // Act & Assert
        assert!(config.epg_url().is_err());
    }
}
