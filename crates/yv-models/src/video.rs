//! Video models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::page::Keyed;

/// Maximum title length accepted for videos and playlists.
pub const MAX_TITLE_LEN: u64 = 255;

/// Store-assigned video identifier. Monotonically increasing, so it doubles as
/// the keyset ordering key for every video listing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct VideoId(pub i64);

impl VideoId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for VideoId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Random identifier shared by every artifact of one upload (temp files and blobs).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct UploadId(pub String);

impl UploadId {
    /// Generate a new random upload ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UploadId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who can see a video.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Privacy {
    /// Listed everywhere
    #[default]
    Public,
    /// Owner only
    Private,
    /// Anyone with the link, never listed
    Unlisted,
}

impl Privacy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Privacy::Public => "public",
            Privacy::Private => "private",
            Privacy::Unlisted => "unlisted",
        }
    }

    /// Stored integer code.
    pub fn code(&self) -> i64 {
        match self {
            Privacy::Public => 0,
            Privacy::Private => 1,
            Privacy::Unlisted => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Privacy::Public),
            1 => Some(Privacy::Private),
            2 => Some(Privacy::Unlisted),
            _ => None,
        }
    }
}

impl fmt::Display for Privacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Privacy {
    type Err = String;

    /// Accepts either the name (`public`) or the stored code (`0`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<i64>() {
            return Privacy::from_code(code).ok_or_else(|| format!("unknown privacy code {code}"));
        }
        match s.to_ascii_lowercase().as_str() {
            "public" => Ok(Privacy::Public),
            "private" => Ok(Privacy::Private),
            "unlisted" => Ok(Privacy::Unlisted),
            other => Err(format!("unknown privacy '{other}'")),
        }
    }
}

/// A persisted video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Video {
    pub id: VideoId,
    pub owner_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Playback URL of the transcoded file
    pub video_url: String,
    /// Empty when no thumbnail could be produced
    #[serde(default)]
    pub thumbnail_url: String,
    /// Short silent loop; empty when generation failed
    #[serde(default)]
    pub preview_url: String,
    /// `HH:MM:SS`
    pub duration: String,
    pub privacy: Privacy,
    #[serde(default)]
    pub ai_summary: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Video {
    /// Whether `viewer` may open the watch page for this video.
    ///
    /// Unlisted videos are reachable by id; private ones only by their owner.
    pub fn visible_to(&self, viewer: Option<&str>) -> bool {
        match self.privacy {
            Privacy::Public | Privacy::Unlisted => true,
            Privacy::Private => viewer == Some(self.owner_id.as_str()),
        }
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }

    /// Blob URLs owned by this video (skips empty fields).
    pub fn blob_urls(&self) -> Vec<&str> {
        [
            self.video_url.as_str(),
            self.thumbnail_url.as_str(),
            self.preview_url.as_str(),
        ]
        .into_iter()
        .filter(|u| !u.is_empty())
        .collect()
    }
}

impl Keyed for Video {
    fn key(&self) -> i64 {
        self.id.0
    }
}

/// Everything the pipeline gathered for a new video row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewVideo {
    pub owner_id: String,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub preview_url: String,
    pub duration: String,
    pub privacy: Privacy,
    pub ai_summary: String,
}

/// Owner-editable fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct VideoEdit {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub privacy: Privacy,
}

/// Compact video listing entry with the uploader's display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoCard {
    pub id: VideoId,
    pub owner_id: String,
    pub owner_name: String,
    pub title: String,
    pub thumbnail_url: String,
    pub preview_url: String,
    pub duration: String,
    pub privacy: Privacy,
    pub created_at: DateTime<Utc>,
}

impl Keyed for VideoCard {
    fn key(&self) -> i64 {
        self.id.0
    }
}

/// A liked video, keyed by the reaction row so the liked list pages in
/// like order rather than upload order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LikedVideo {
    pub reaction_id: i64,
    pub liked_at: DateTime<Utc>,
    pub video: VideoCard,
}

impl Keyed for LikedVideo {
    fn key(&self) -> i64 {
        self.reaction_id
    }
}
