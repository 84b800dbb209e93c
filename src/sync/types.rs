use std::fmt;

use serde::{Deserialize, Serialize};

/// A desired track as declared by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRequest {
    pub artist: String,
    pub track: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
}

impl TrackRequest {
    pub fn new(artist: impl Into<String>, track: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            track: track.into(),
            album: None,
        }
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    /// Album hint, ignoring blank values.
    pub fn album_hint(&self) -> Option<&str> {
        self.album.as_deref().filter(|a| !a.trim().is_empty())
    }

    /// `"{artist} - {track}"`, as reported for unresolved requests.
    pub fn label(&self) -> String {
        format!("{} - {}", self.artist, self.track)
    }
}

/// Point-in-time read of a remote playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSnapshot {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub track_uris: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    Created,
    Updated,
    Unchanged,
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyncAction::Created => "created",
            SyncAction::Updated => "updated",
            SyncAction::Unchanged => "unchanged",
        };
        f.pad(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub playlist_id: String,
    pub action: SyncAction,
    pub unresolved: Vec<String>,
}

/// A playlist as stored on disk: the input of `build`, the output of `export`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistManifest {
    #[serde(default = "default_playlist_name")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tracks: Vec<TrackRequest>,
}

fn default_playlist_name() -> String {
    "New Playlist".to_string()
}
