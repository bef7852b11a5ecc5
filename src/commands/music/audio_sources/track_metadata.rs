//! Defines the `TrackMetadata` struct, the unified representation of a queued song
//! regardless of which service it was discovered through.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::commands::music::utils::format_duration;

/// Where a track was originally requested from. Playback always goes through YouTube.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrackSource {
    #[default]
    Youtube,
    Spotify,
}

/// Unified representation of metadata for a playable track.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackMetadata {
    /// The title of the track.
    pub title: String,
    /// The YouTube watch URL used to stream the track.
    pub url: String,
    /// The duration of the track, if known.
    #[serde(default, with = "humantime_serde")]
    pub duration: Option<Duration>,
    /// URL to a thumbnail image for the track, if available.
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Name of the uploading channel.
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub views: Option<u64>,
    /// Display name of the member who requested the track.
    #[serde(default)]
    pub requested_by: Option<String>,
    #[serde(default)]
    pub source: TrackSource,
}

impl Default for TrackMetadata {
    fn default() -> Self {
        Self {
            title: "Unknown Track".to_string(),
            url: String::new(),
            duration: None,
            thumbnail: None,
            channel: None,
            views: None,
            requested_by: None,
            source: TrackSource::Youtube,
        }
    }
}

impl TrackMetadata {
    /// Returns a copy of this track attributed to `requested_by`.
    pub fn requested_by(mut self, requested_by: impl Into<String>) -> Self {
        self.requested_by = Some(requested_by.into());
        self
    }

    /// Human readable duration, `Unknown` when the source did not report one.
    pub fn duration_label(&self) -> String {
        self.duration
            .map(format_duration)
            .unwrap_or_else(|| "Unknown".to_string())
    }

    pub fn requester_label(&self) -> &str {
        self.requested_by.as_deref().unwrap_or("Unknown")
    }

    pub fn channel_label(&self) -> &str {
        self.channel.as_deref().unwrap_or("Unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_duration_label_unknown_without_duration() {
        let track = TrackMetadata::default();
        assert_eq!(track.duration_label(), "Unknown");
    }

    #[test]
    fn test_requested_by_sets_requester() {
        let track = TrackMetadata::default().requested_by("alice");
        assert_eq!(track.requester_label(), "alice");
    }

    /// Saved playlists written before optional fields existed must still load.
    #[test]
    fn test_deserialize_with_missing_optional_fields() {
        let json = r#"{"title":"Song","url":"https://youtu.be/abcdefghijk"}"#;
        let track: TrackMetadata = serde_json::from_str(json).unwrap();

        assert_eq!(track.title, "Song");
        assert_eq!(track.duration, None);
        assert_eq!(track.source, TrackSource::Youtube);
    }

    #[test]
    fn test_serialized_duration_is_human_readable() {
        let track = TrackMetadata {
            title: "Song".into(),
            url: "https://youtu.be/abcdefghijk".into(),
            duration: Some(Duration::from_secs(185)),
            source: TrackSource::Spotify,
            ..Default::default()
        };

        let value = serde_json::to_value(&track).unwrap();
        assert_eq!(value["duration"], "3m 5s");
        assert_eq!(value["source"], "spotify");
    }
}
