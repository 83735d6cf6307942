//! Comments, reactions, subscriptions and watch history.

use chrono::{DateTime, Duration, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::page::Keyed;
use crate::video::{VideoCard, VideoId};

/// Minimum gap between two recorded views of the same video by the same user.
pub const WATCH_DEDUP_WINDOW_MINUTES: i64 = 5;

/// What a reaction points at. Exactly one of video or comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum ReactionTarget {
    Video(VideoId),
    Comment(i64),
}

/// A like or dislike row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Reaction {
    pub id: i64,
    pub user_id: String,
    pub target: ReactionTarget,
    pub is_like: bool,
    pub created_at: DateTime<Utc>,
}

/// The viewer's current reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReactionStatus {
    Like,
    Dislike,
    #[default]
    None,
}

impl ReactionStatus {
    pub fn from_is_like(is_like: Option<bool>) -> Self {
        match is_like {
            Some(true) => ReactionStatus::Like,
            Some(false) => ReactionStatus::Dislike,
            None => ReactionStatus::None,
        }
    }
}

/// Counts after a reaction toggle, plus the viewer's resulting status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReactionCounts {
    pub likes: i64,
    pub dislikes: i64,
    pub status: ReactionStatus,
}

/// Follower → creator edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Subscription {
    pub id: i64,
    pub follower_id: String,
    pub creator_id: String,
    pub created_at: DateTime<Utc>,
}

/// One recorded view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WatchHistoryEntry {
    pub id: i64,
    pub user_id: String,
    pub video_id: VideoId,
    pub watched_at: DateTime<Utc>,
}

impl WatchHistoryEntry {
    /// Whether a view at `now` should be recorded given this latest entry.
    pub fn allows_new_view_at(&self, now: DateTime<Utc>) -> bool {
        now - self.watched_at >= Duration::minutes(WATCH_DEDUP_WINDOW_MINUTES)
    }
}

/// Watch history listing entry, keyed by the history row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HistoryItem {
    pub history_id: i64,
    pub watched_at: DateTime<Utc>,
    pub video: VideoCard,
}

impl Keyed for HistoryItem {
    fn key(&self) -> i64 {
        self.history_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Comment {
    pub id: i64,
    pub video_id: VideoId,
    pub author_id: String,
    /// Set for replies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Comment as shown on the watch page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub author_name: String,
    pub likes: i64,
    pub dislikes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewComment {
    pub video_id: VideoId,
    pub author_id: String,
    pub parent_id: Option<i64>,
    pub content: String,
}

impl NewComment {
    /// Comments must contain something other than whitespace.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_window_boundary() {
        let now = Utc::now();
        let entry = WatchHistoryEntry {
            id: 1,
            user_id: "u".into(),
            video_id: VideoId(1),
            watched_at: now,
        };
        assert!(!entry.allows_new_view_at(now + Duration::minutes(4)));
        assert!(entry.allows_new_view_at(now + Duration::minutes(5)));
        assert!(entry.allows_new_view_at(now + Duration::hours(2)));
    }

    #[test]
    fn test_reaction_status() {
        assert_eq!(ReactionStatus::from_is_like(Some(true)), ReactionStatus::Like);
        assert_eq!(ReactionStatus::from_is_like(Some(false)), ReactionStatus::Dislike);
        assert_eq!(ReactionStatus::from_is_like(None), ReactionStatus::None);
        assert_eq!(
            serde_json::to_value(ReactionStatus::None).unwrap(),
            serde_json::json!("none")
        );
    }

    #[test]
    fn test_blank_comment() {
        let c = NewComment {
            video_id: VideoId(1),
            author_id: "u".into(),
            parent_id: None,
            content: " \n\t".into(),
        };
        assert!(c.is_blank());
    }
}
