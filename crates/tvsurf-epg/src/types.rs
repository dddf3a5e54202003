//! EPG document types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Line rendered when a channel has no guide entries.
pub const NO_PROGRAMMING_PLACEHOLDER: &str = "No programming information available";

/// A single guide entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    /// Start time label (free-form, e.g. "20:00").
    pub time: String,
    /// Program title.
    pub title: String,
}

impl Program {
    /// Formats the entry as a listing line (`"time - title"`).
    #[must_use]
    pub fn listing_line(&self) -> String {
        format!("{} - {}", self.time, self.title)
    }
}

/// The whole EPG document: channel identifier to ordered programs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
#[allow(clippy::module_name_repetitions)]
pub struct EpgGuide {
    channels: HashMap<String, Vec<Program>>,
}

impl EpgGuide {
    /// Returns the programs of a channel, empty if the channel is unknown.
    #[must_use]
    pub fn programs_for(&self, channel_id: &str) -> &[Program] {
        self.channels
            .get(channel_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Title of the first program of a channel.
    #[must_use]
    pub fn now_playing(&self, channel_id: &str) -> Option<&str> {
        self.programs_for(channel_id)
            .first()
            .map(|p| p.title.as_str())
    }

    /// Builds the listing lines shown in the EPG panel.
    ///
    /// A channel without entries yields the single placeholder line.
    #[must_use]
    pub fn listing_lines(&self, channel_id: &str) -> Vec<String> {
        let programs = self.programs_for(channel_id);
        if programs.is_empty() {
            return vec![String::from(NO_PROGRAMMING_PLACEHOLDER)];
        }
        programs.iter().map(Program::listing_line).collect()
    }

    /// Number of channels present in the document.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

impl FromIterator<(String, Vec<Program>)> for EpgGuide {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Program>)>>(iter: I) -> Self {
        Self {
            channels: iter.into_iter().collect(),
        }
    }
}
