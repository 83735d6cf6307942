//! Relational store for YouView.
//!
//! Every foreign key is restrictive: rows with dependents can only be
//! removed through the `*_with_dependents` operations, which delete the
//! whole dependency tree inside one transaction.
//!
//! Listing queries follow one keyset contract: rows come back ordered by
//! their key descending, restricted to `key < cursor` when a cursor is
//! given, and capped at `limit`.

pub mod config;
pub mod error;
mod schema;
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use yv_models::{
    Comment, CommentView, HistoryItem, LikedVideo, NewComment, NewVideo, Playlist,
    PlaylistDetails, PlaylistMembership, ProfileUpdate, ReactionCounts, ReactionTarget, User,
    Video, VideoCard, VideoEdit, VideoId, WatchHistoryEntry,
};

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use sqlite::SqliteStore;

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Create the user row on first sight of an authenticated identity.
    async fn ensure_user(&self, id: &str, username: &str) -> StoreResult<User>;

    async fn get_user(&self, id: &str) -> StoreResult<Option<User>>;

    async fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    async fn update_profile(&self, id: &str, update: &ProfileUpdate) -> StoreResult<User>;

    /// Swap the picture URL, returning the previous one.
    async fn set_profile_picture(&self, id: &str, url: &str) -> StoreResult<Option<String>>;

    /// Returns false when the user does not exist.
    async fn set_premium(&self, id: &str, premium: bool) -> StoreResult<bool>;

    /// Users whose username contains every term (case-insensitive).
    async fn search_users(&self, terms: &[String], limit: usize) -> StoreResult<Vec<User>>;
}

#[async_trait]
pub trait VideoRepo: Send + Sync {
    async fn insert_video(&self, video: &NewVideo) -> StoreResult<Video>;

    async fn get_video(&self, id: VideoId) -> StoreResult<Option<Video>>;

    /// Apply an edit; `thumbnail_url` replaces the thumbnail when given.
    async fn update_video(
        &self,
        id: VideoId,
        edit: &VideoEdit,
        thumbnail_url: Option<&str>,
    ) -> StoreResult<Video>;

    /// Delete only the video row. Fails while dependents exist.
    async fn delete_video_row(&self, id: VideoId) -> StoreResult<()>;

    /// Delete the video and everything referencing it. Returns the deleted
    /// row so the caller can clean up its blobs.
    async fn delete_video_with_dependents(&self, id: VideoId) -> StoreResult<Option<Video>>;
}

#[async_trait]
pub trait ListingRepo: Send + Sync {
    /// Public videos, newest first.
    async fn list_public_videos(
        &self,
        cursor: Option<i64>,
        limit: usize,
    ) -> StoreResult<Vec<VideoCard>>;

    /// Videos of one owner. Non-public videos are included only when asked.
    async fn list_owner_videos(
        &self,
        owner_id: &str,
        include_non_public: bool,
        cursor: Option<i64>,
        limit: usize,
    ) -> StoreResult<Vec<VideoCard>>;

    /// The user's watch history, keyed by history row.
    async fn list_history(
        &self,
        user_id: &str,
        cursor: Option<i64>,
        limit: usize,
    ) -> StoreResult<Vec<HistoryItem>>;

    /// Videos the user liked, keyed by reaction row.
    async fn list_liked(
        &self,
        user_id: &str,
        cursor: Option<i64>,
        limit: usize,
    ) -> StoreResult<Vec<LikedVideo>>;

    /// Public videos whose title or description contains every term.
    async fn search_videos(
        &self,
        terms: &[String],
        cursor: Option<i64>,
        limit: usize,
    ) -> StoreResult<Vec<VideoCard>>;

    /// Public videos from creators the viewer follows that the viewer has
    /// never watched, newest first.
    async fn subscribed_unwatched(&self, viewer_id: &str, limit: usize)
        -> StoreResult<Vec<VideoCard>>;

    /// Public videos by comment count, ties broken by newest.
    async fn trending(&self, limit: usize) -> StoreResult<Vec<VideoCard>>;
}

#[async_trait]
pub trait InteractionRepo: Send + Sync {
    /// Most recent watch of `video_id` by `user_id`.
    async fn latest_watch(
        &self,
        user_id: &str,
        video_id: VideoId,
    ) -> StoreResult<Option<WatchHistoryEntry>>;

    /// Record a view at `at` unless the latest one is still inside the
    /// dedup window. Returns whether a row was written.
    async fn record_watch(
        &self,
        user_id: &str,
        video_id: VideoId,
        at: DateTime<Utc>,
    ) -> StoreResult<bool>;

    /// Insert, remove or flip the user's reaction and return fresh counts.
    async fn toggle_reaction(
        &self,
        user_id: &str,
        target: ReactionTarget,
        is_like: bool,
    ) -> StoreResult<ReactionCounts>;

    async fn reaction_counts(
        &self,
        target: ReactionTarget,
        viewer_id: Option<&str>,
    ) -> StoreResult<ReactionCounts>;

    async fn is_subscribed(&self, follower_id: &str, creator_id: &str) -> StoreResult<bool>;

    /// Follow or unfollow. Returns the new state and the subscriber count.
    async fn toggle_subscription(
        &self,
        follower_id: &str,
        creator_id: &str,
    ) -> StoreResult<(bool, i64)>;

    async fn subscriber_count(&self, creator_id: &str) -> StoreResult<i64>;

    /// Insert a comment. A parent must belong to the same video.
    async fn add_comment(&self, comment: &NewComment) -> StoreResult<Comment>;

    async fn get_comment(&self, id: i64) -> StoreResult<Option<Comment>>;

    /// Comments of a video, oldest first.
    async fn list_comments(&self, video_id: VideoId) -> StoreResult<Vec<CommentView>>;

    /// Delete a comment, its replies (deepest first) and their reactions.
    /// Returns the number of comments removed.
    async fn delete_comment_with_dependents(&self, id: i64) -> StoreResult<u64>;
}

#[async_trait]
pub trait PlaylistRepo: Send + Sync {
    async fn create_playlist(
        &self,
        owner_id: &str,
        name: &str,
        description: &str,
    ) -> StoreResult<Playlist>;

    async fn get_playlist(&self, id: i64) -> StoreResult<Option<Playlist>>;

    async fn rename_playlist(&self, id: i64, name: &str) -> StoreResult<Playlist>;

    /// Delete the playlist and its links.
    async fn delete_playlist_with_links(&self, id: i64) -> StoreResult<()>;

    /// Add the video if absent, remove it if present. Returns whether the
    /// playlist now contains it.
    async fn toggle_playlist_video(&self, playlist_id: i64, video_id: VideoId)
        -> StoreResult<bool>;

    /// Returns whether a link was removed.
    async fn remove_playlist_video(&self, playlist_id: i64, video_id: VideoId)
        -> StoreResult<bool>;

    /// The owner's playlists, flagged for `video_id` when given.
    async fn list_playlists(
        &self,
        owner_id: &str,
        video_id: Option<VideoId>,
    ) -> StoreResult<Vec<PlaylistMembership>>;

    async fn playlist_details(&self, id: i64) -> StoreResult<Option<PlaylistDetails>>;
}

/// Everything the application needs from persistence.
#[async_trait]
pub trait Store: UserRepo + VideoRepo + ListingRepo + InteractionRepo + PlaylistRepo {
    /// Readiness probe.
    async fn ping(&self) -> StoreResult<()>;
}
