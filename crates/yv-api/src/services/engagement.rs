//! Views, reactions, comments and subscriptions.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use yv_models::{Clock, Comment, NewComment, ReactionCounts, ReactionTarget, VideoId};
use yv_store::Store;

use crate::error::{ApiError, ApiResult};
use crate::services::VideoService;

/// Follow state after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubscriptionState {
    pub subscribed: bool,
    pub subscriber_count: i64,
}

#[derive(Clone)]
pub struct EngagementService {
    store: Arc<dyn Store>,
    videos: VideoService,
    clock: Arc<dyn Clock>,
}

impl EngagementService {
    pub fn new(store: Arc<dyn Store>, videos: VideoService, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            videos,
            clock,
        }
    }

    /// Add a history row unless the viewer watched this video moments ago.
    pub async fn record_watch(&self, user_id: &str, video_id: VideoId) -> ApiResult<bool> {
        let written = self
            .store
            .record_watch(user_id, video_id, self.clock.now())
            .await?;
        debug!(user_id, video_id = %video_id, written, "Watch recorded");
        Ok(written)
    }

    pub async fn react_to_video(
        &self,
        user_id: &str,
        video_id: VideoId,
        is_like: bool,
    ) -> ApiResult<ReactionCounts> {
        self.videos.visible_video(video_id, Some(user_id)).await?;
        let counts = self
            .store
            .toggle_reaction(user_id, ReactionTarget::Video(video_id), is_like)
            .await?;
        Ok(counts)
    }

    pub async fn react_to_comment(
        &self,
        user_id: &str,
        comment_id: i64,
        is_like: bool,
    ) -> ApiResult<ReactionCounts> {
        let comment = self.comment(comment_id).await?;
        self.videos
            .visible_video(comment.video_id, Some(user_id))
            .await?;
        let counts = self
            .store
            .toggle_reaction(user_id, ReactionTarget::Comment(comment_id), is_like)
            .await?;
        Ok(counts)
    }

    /// Post a comment or a reply. Replies must stay on the parent's video.
    pub async fn add_comment(
        &self,
        user_id: &str,
        video_id: VideoId,
        content: &str,
        parent_id: Option<i64>,
    ) -> ApiResult<Comment> {
        let comment = NewComment {
            video_id,
            author_id: user_id.to_string(),
            parent_id,
            content: content.to_string(),
        };
        if comment.is_blank() {
            return Err(ApiError::validation("Comment cannot be empty"));
        }
        self.videos.visible_video(video_id, Some(user_id)).await?;

        let saved = self.store.add_comment(&comment).await?;
        info!(comment_id = saved.id, video_id = %video_id, user_id, "Comment added");
        Ok(saved)
    }

    /// Author-only delete of a comment thread. Returns the number of comments
    /// removed.
    pub async fn delete_comment(&self, user_id: &str, comment_id: i64) -> ApiResult<u64> {
        let comment = self.comment(comment_id).await?;
        if comment.author_id != user_id {
            return Err(ApiError::forbidden("You can only delete your own comments"));
        }
        let removed = self.store.delete_comment_with_dependents(comment_id).await?;
        info!(comment_id, removed, user_id, "Comment thread deleted");
        Ok(removed)
    }

    pub async fn toggle_subscription(
        &self,
        follower_id: &str,
        creator_id: &str,
    ) -> ApiResult<SubscriptionState> {
        if follower_id == creator_id {
            return Err(ApiError::validation("You cannot subscribe to yourself"));
        }
        if self.store.get_user(creator_id).await?.is_none() {
            return Err(ApiError::not_found(format!("Creator {} not found", creator_id)));
        }
        let (subscribed, subscriber_count) = self
            .store
            .toggle_subscription(follower_id, creator_id)
            .await?;
        info!(follower_id, creator_id, subscribed, "Subscription toggled");
        Ok(SubscriptionState {
            subscribed,
            subscriber_count,
        })
    }

    async fn comment(&self, id: i64) -> ApiResult<Comment> {
        self.store
            .get_comment(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Comment {} not found", id)))
    }
}
