//! Navigation controller state management.

use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use tvsurf_epg::EpgGuide;

use super::auto_hide::AutoHideTimer;
use crate::config::ChannelConfig;
use crate::player::PlaybackSink;

/// A channel row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    /// Channel identifier (EPG key).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Stream source URI.
    pub src: String,
    /// Inline "now playing" label.
    pub program_info: String,
}

impl From<&ChannelConfig> for Channel {
    fn from(value: &ChannelConfig) -> Self {
        Self {
            id: value.id.clone(),
            name: value.name.clone(),
            src: value.src.clone(),
            program_info: value.info.clone(),
        }
    }
}

/// Remote-control keys understood by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteKey {
    /// Open the list, or commit and close it.
    Enter,
    /// Previous channel.
    Up,
    /// Next channel.
    Down,
    /// Close the EPG panel.
    Left,
    /// Open the EPG panel.
    Right,
}

/// Selection move direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// `-1`
    Previous,
    /// `+1`
    Next,
}

/// An EPG load the controller wants performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EpgRequest {
    /// Listing for the EPG panel.
    Listing {
        /// Request sequence number; only the latest one is applied.
        token: u64,
        /// Channel whose programs are shown.
        channel_id: String,
    },
    /// Inline "now playing" labels for every channel row.
    Summaries,
}

/// Completed EPG load.
#[derive(Debug)]
pub struct EpgLoad {
    /// The request this answers.
    pub request: EpgRequest,
    /// Fetched guide or failure reason.
    pub result: Result<EpgGuide>,
}

/// Navigation controller.
///
/// `current_index` is the single source of truth for selection; the renderer
/// projects every frame from this struct.
#[derive(Debug)]
pub struct NavigationController<P> {
    /// Channels in selection order (never empty).
    channels: Vec<Channel>,
    /// Selected row, always `< channels.len()`.
    current_index: usize,
    /// Channel list panel shown.
    channel_list_visible: bool,
    /// EPG panel shown.
    epg_visible: bool,
    /// Channel list auto-hide countdown.
    auto_hide: AutoHideTimer,
    /// Rendered EPG panel lines.
    epg_lines: Vec<String>,
    /// Channel the EPG lines belong to.
    epg_channel_id: Option<String>,
    /// Token of the latest listing request.
    latest_listing_token: u64,
    /// Channel committed to playback.
    playing_index: Option<usize>,
    /// Playback sink.
    sink: P,
}

impl<P> NavigationController<P> {
    /// Creates a controller with the first channel selected and both panels hidden.
    ///
    /// # Errors
    ///
    /// Returns an error if `channels` is empty.
    pub fn new(channels: Vec<Channel>, sink: P, auto_hide_delay: Duration) -> Result<Self> {
        if channels.is_empty() {
            bail!("at least one channel is required");
        }

        Ok(Self {
            channels,
            current_index: 0,
            channel_list_visible: false,
            epg_visible: false,
            auto_hide: AutoHideTimer::new(auto_hide_delay),
            epg_lines: Vec::new(),
            epg_channel_id: None,
            latest_listing_token: 0,
            playing_index: None,
            sink,
        })
    }

    /// Returns all channels.
    #[must_use]
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Returns the selected row.
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current_index
    }

    /// Returns the selected channel.
    #[must_use]
    pub fn current_channel(&self) -> Option<&Channel> {
        self.channels.get(self.current_index)
    }

    /// Whether the row at `index` is rendered as selected.
    #[must_use]
    pub const fn is_selected(&self, index: usize) -> bool {
        index == self.current_index
    }

    /// Whether the channel list panel is shown.
    #[must_use]
    pub const fn channel_list_visible(&self) -> bool {
        self.channel_list_visible
    }

    /// Whether the EPG panel is shown.
    #[must_use]
    pub const fn epg_visible(&self) -> bool {
        self.epg_visible
    }

    /// Returns the EPG panel lines.
    #[must_use]
    pub fn epg_lines(&self) -> &[String] {
        &self.epg_lines
    }

    /// Returns the channel the EPG panel lines belong to.
    #[must_use]
    pub fn epg_channel(&self) -> Option<&Channel> {
        let id = self.epg_channel_id.as_deref()?;
        self.channels.iter().find(|ch| ch.id == id)
    }

    /// Returns the channel committed to playback.
    #[must_use]
    pub fn playing(&self) -> Option<&Channel> {
        self.channels.get(self.playing_index?)
    }

    /// Returns the pending auto-hide deadline.
    #[must_use]
    pub const fn auto_hide_deadline(&self) -> Option<Instant> {
        self.auto_hide.deadline()
    }

    /// Returns the playback sink.
    #[must_use]
    pub const fn sink(&self) -> &P {
        &self.sink
    }
}

impl<P: PlaybackSink> NavigationController<P> {
    /// Marks the channel at `index` as selected. Out-of-range indices are ignored.
    ///
    /// Returns `true` if the selection changed.
    pub fn select_visually(&mut self, index: usize) -> bool {
        if index >= self.channels.len() || index == self.current_index {
            return false;
        }
        self.current_index = index;
        true
    }

    /// Hands the selected channel's stream to the playback sink.
    pub fn commit_selection(&mut self) {
        let Some(channel) = self.channels.get(self.current_index) else {
            return;
        };

        tracing::info!(channel = %channel.id, src = %channel.src, "Switching channel");
        self.sink.set_source(&channel.src);
        if let Err(e) = self.sink.reload() {
            tracing::warn!("Playback reload failed: {e:#}");
        }
        self.playing_index = Some(self.current_index);
    }

    /// Shows the list (arming auto-hide), or commits the selection and hides it.
    pub fn toggle_channel_list(&mut self, now: Instant) {
        if self.channel_list_visible {
            self.commit_selection();
            self.hide_channel_list();
        } else {
            self.channel_list_visible = true;
            self.arm_auto_hide(now);
        }
    }

    /// Moves the selection one row, wrapping at both ends. No-op while the list is hidden.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn move_selection(&mut self, step: Step, now: Instant) {
        if !self.channel_list_visible {
            return;
        }

        let count = self.channels.len();
        self.current_index = match step {
            Step::Next => (self.current_index + 1) % count,
            Step::Previous => (self.current_index + count - 1) % count,
        };
        self.arm_auto_hide(now);
    }

    /// Reveals the EPG panel and requests the selected channel's listing.
    ///
    /// Returns `None` while the channel list is hidden.
    pub fn show_epg(&mut self) -> Option<EpgRequest> {
        if !self.channel_list_visible {
            return None;
        }

        self.epg_visible = true;
        let channel_id = self.current_channel()?.id.clone();
        Some(self.load_epg_data(channel_id))
    }

    /// Hides the EPG panel. The channel list is left alone.
    pub const fn hide_epg(&mut self) {
        if self.epg_visible {
            self.epg_visible = false;
        }
    }

    /// (Re)starts the auto-hide countdown.
    pub fn arm_auto_hide(&mut self, now: Instant) {
        self.auto_hide.arm(now);
    }

    /// Pointer movement over the channel list keeps it open.
    pub fn pointer_moved(&mut self, now: Instant) {
        if self.channel_list_visible {
            self.arm_auto_hide(now);
        }
    }

    /// Pointer click on a row: selects it without committing or hiding.
    pub fn click_row(&mut self, index: usize) {
        self.select_visually(index);
    }

    /// Fires the auto-hide countdown if due. Returns `true` if the list was hidden.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.auto_hide.fire(now) {
            return false;
        }
        self.channel_list_visible = false;
        tracing::debug!("Channel list auto-hidden");
        true
    }

    /// Issues a listing request for `channel_id`, superseding earlier ones.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn load_epg_data(&mut self, channel_id: String) -> EpgRequest {
        self.latest_listing_token += 1;
        EpgRequest::Listing {
            token: self.latest_listing_token,
            channel_id,
        }
    }

    /// Issues the startup request for inline program labels.
    #[must_use]
    pub const fn refresh_program_summaries(&self) -> EpgRequest {
        EpgRequest::Summaries
    }

    /// Dispatches a remote key. Returns an EPG load to perform, if any.
    pub fn handle_key(&mut self, key: RemoteKey, now: Instant) -> Option<EpgRequest> {
        match key {
            RemoteKey::Enter => self.toggle_channel_list(now),
            RemoteKey::Down => self.move_selection(Step::Next, now),
            RemoteKey::Up => self.move_selection(Step::Previous, now),
            RemoteKey::Right => return self.show_epg(),
            RemoteKey::Left => self.hide_epg(),
        }
        None
    }

    /// Applies a completed EPG load.
    ///
    /// Failures are logged and leave the panels untouched. Listings answering
    /// a superseded request are dropped.
    pub fn apply_load(&mut self, load: EpgLoad) {
        match load.request {
            EpgRequest::Listing { token, channel_id } => {
                if token != self.latest_listing_token {
                    tracing::debug!(token, channel = %channel_id, "Dropping stale EPG listing");
                    return;
                }
                match load.result {
                    Ok(guide) => {
                        self.epg_lines = guide.listing_lines(&channel_id);
                        tracing::debug!(
                            channel = %channel_id,
                            lines = self.epg_lines.len(),
                            "EPG listing updated"
                        );
                        self.epg_channel_id = Some(channel_id);
                    }
                    Err(e) => {
                        tracing::error!("Failed to load EPG for {channel_id}: {e:#}");
                    }
                }
            }
            EpgRequest::Summaries => match load.result {
                Ok(guide) => {
                    for channel in &mut self.channels {
                        channel.program_info =
                            String::from(guide.now_playing(&channel.id).unwrap_or_default());
                    }
                    tracing::debug!("Program summaries updated");
                }
                Err(e) => {
                    tracing::error!("Failed to load program summaries: {e:#}");
                }
            },
        }
    }

    /// Hides the channel list and drops its countdown.
    fn hide_channel_list(&mut self) {
        self.channel_list_visible = false;
        self.auto_hide.cancel();
    }
}
