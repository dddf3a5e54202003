//! Playback sink: hands the committed stream URI to a player.

use std::process::{Child, Command, Stdio};

use anyhow::{Context, Result};

use crate::config::PlayerConfig;

/// Something that can play a stream URI.
///
/// The navigation controller only feeds it a source and asks it to reload;
/// buffering and playback errors are the sink's own business.
pub trait PlaybackSink {
    /// Replaces the active playback source.
    fn set_source(&mut self, uri: &str);

    /// (Re)loads the active source.
    ///
    /// # Errors
    ///
    /// Returns an error if the player cannot be started.
    fn reload(&mut self) -> Result<()>;
}

/// Plays streams with an external process or the OS default opener.
#[derive(Debug)]
pub struct ExternalPlayer {
    /// Configured player command, if any.
    config: PlayerConfig,
    /// Active source.
    source: Option<String>,
    /// Running player process (command mode only).
    child: Option<Child>,
}

impl ExternalPlayer {
    /// Creates a player from config.
    #[must_use]
    pub const fn new(config: PlayerConfig) -> Self {
        Self {
            config,
            source: None,
            child: None,
        }
    }

    /// Returns the active source.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Stops the running player process, if any.
    fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                tracing::debug!(error = %e, "Player process already exited");
            }
            if let Err(e) = child.wait() {
                tracing::warn!(error = %e, "Failed to reap player process");
            }
        }
    }
}

impl PlaybackSink for ExternalPlayer {
    fn set_source(&mut self, uri: &str) {
        self.source = Some(String::from(uri));
    }

    fn reload(&mut self) -> Result<()> {
        let Some(source) = self.source.clone() else {
            return Ok(());
        };

        self.stop();

        match self.config.command.as_deref() {
            Some(command) => {
                let child = Command::new(command)
                    .args(&self.config.args)
                    .arg(&source)
                    .stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .spawn()
                    .with_context(|| format!("failed to start player {command:?}"))?;
                tracing::info!(%command, %source, pid = child.id(), "Player started");
                self.child = Some(child);
            }
            None => {
                open::that_detached(&source)
                    .with_context(|| format!("failed to open {source}"))?;
                tracing::info!(%source, "Stream handed to default opener");
            }
        }
        Ok(())
    }
}

impl Drop for ExternalPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}
