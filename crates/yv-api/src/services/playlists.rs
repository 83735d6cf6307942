//! Owner-only playlist management.
//!
//! A playlist that belongs to someone else is reported as missing rather
//! than forbidden, so ids of other users' playlists cannot be probed.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use yv_models::video::MAX_TITLE_LEN;
use yv_models::{Playlist, PlaylistDetails, PlaylistMembership, VideoId};
use yv_store::Store;

use crate::error::{ApiError, ApiResult};
use crate::services::VideoService;

/// Membership after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlaylistToggle {
    pub playlist_id: i64,
    pub video_id: VideoId,
    pub contains_video: bool,
}

fn clean_name(name: &str) -> ApiResult<String> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() as u64 > MAX_TITLE_LEN {
        return Err(ApiError::validation(format!(
            "Playlist name must be 1 to {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(name.to_string())
}

#[derive(Clone)]
pub struct PlaylistService {
    store: Arc<dyn Store>,
    videos: VideoService,
}

impl PlaylistService {
    pub fn new(store: Arc<dyn Store>, videos: VideoService) -> Self {
        Self { store, videos }
    }

    pub async fn create(&self, owner_id: &str, name: &str) -> ApiResult<Playlist> {
        let name = clean_name(name)?;
        let playlist = self.store.create_playlist(owner_id, &name, "").await?;
        info!(playlist_id = playlist.id, owner_id, "Playlist created");
        Ok(playlist)
    }

    async fn owned(&self, id: i64, user_id: &str) -> ApiResult<Playlist> {
        self.store
            .get_playlist(id)
            .await?
            .filter(|p| p.owner_id == user_id)
            .ok_or_else(|| ApiError::not_found(format!("Playlist {} not found", id)))
    }

    pub async fn details(&self, id: i64, user_id: &str) -> ApiResult<PlaylistDetails> {
        self.owned(id, user_id).await?;
        self.store
            .playlist_details(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Playlist {} not found", id)))
    }

    pub async fn rename(&self, id: i64, user_id: &str, name: &str) -> ApiResult<Playlist> {
        let name = clean_name(name)?;
        self.owned(id, user_id).await?;
        Ok(self.store.rename_playlist(id, &name).await?)
    }

    pub async fn delete(&self, id: i64, user_id: &str) -> ApiResult<()> {
        self.owned(id, user_id).await?;
        self.store.delete_playlist_with_links(id).await?;
        info!(playlist_id = id, user_id, "Playlist deleted");
        Ok(())
    }

    pub async fn toggle_video(
        &self,
        id: i64,
        user_id: &str,
        video_id: VideoId,
    ) -> ApiResult<PlaylistToggle> {
        self.owned(id, user_id).await?;
        self.videos.visible_video(video_id, Some(user_id)).await?;
        let contains_video = self.store.toggle_playlist_video(id, video_id).await?;
        Ok(PlaylistToggle {
            playlist_id: id,
            video_id,
            contains_video,
        })
    }

    pub async fn remove_video(&self, id: i64, user_id: &str, video_id: VideoId) -> ApiResult<()> {
        self.owned(id, user_id).await?;
        if !self.store.remove_playlist_video(id, video_id).await? {
            return Err(ApiError::not_found(format!(
                "Video {} is not in playlist {}",
                video_id, id
            )));
        }
        Ok(())
    }

    /// The user's playlists, flagged for `video_id` when given.
    pub async fn list(
        &self,
        user_id: &str,
        video_id: Option<VideoId>,
    ) -> ApiResult<Vec<PlaylistMembership>> {
        Ok(self.store.list_playlists(user_id, video_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("  Road trips ").unwrap(), "Road trips");
        assert!(clean_name(" \t").is_err());
        assert!(clean_name(&"x".repeat(256)).is_err());
        assert!(clean_name(&"x".repeat(255)).is_ok());
    }
}
