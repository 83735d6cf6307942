//! Playlist models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::video::VideoCard;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Playlist {
    pub id: i64,
    pub owner_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// A video inside a playlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlaylistEntry {
    pub added_at: DateTime<Utc>,
    pub video: VideoCard,
}

/// Playlist with its videos, most recently added first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlaylistDetails {
    pub playlist: Playlist,
    pub owner_name: String,
    pub videos: Vec<PlaylistEntry>,
}

/// One of the viewer's playlists, annotated for the "save to playlist" menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlaylistMembership {
    pub playlist: Playlist,
    pub video_count: i64,
    /// Whether the queried video is already in this playlist
    pub contains_video: bool,
}
