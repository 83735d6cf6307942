//! Watch page, edit and delete of single videos.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use yv_models::{CommentView, ReactionCounts, ReactionTarget, User, Video, VideoEdit, VideoId};
use yv_pipeline::safe_extension;
use yv_storage::{guess_content_type, Container, ObjectStore};
use yv_store::Store;

use crate::error::{ApiError, ApiResult};

/// Everything the watch page shows.
#[derive(Debug, Serialize)]
pub struct WatchPage {
    pub video: Video,
    pub uploader: User,
    pub subscriber_count: i64,
    pub is_subscribed: bool,
    /// Oldest first
    pub comments: Vec<CommentView>,
    pub reactions: ReactionCounts,
}

/// Replacement thumbnail sent with an edit.
#[derive(Debug)]
pub struct NewThumbnail {
    pub file_name: String,
    pub data: Vec<u8>,
}

#[derive(Clone)]
pub struct VideoService {
    store: Arc<dyn Store>,
    objects: Arc<dyn ObjectStore>,
}

impl VideoService {
    pub fn new(store: Arc<dyn Store>, objects: Arc<dyn ObjectStore>) -> Self {
        Self { store, objects }
    }

    /// A video the viewer may see. Private videos of others look missing.
    pub async fn visible_video(&self, id: VideoId, viewer_id: Option<&str>) -> ApiResult<Video> {
        self.store
            .get_video(id)
            .await?
            .filter(|v| v.visible_to(viewer_id))
            .ok_or_else(|| ApiError::not_found(format!("Video {} not found", id)))
    }

    /// A video the user owns.
    pub async fn owned_video(&self, id: VideoId, user_id: &str) -> ApiResult<Video> {
        let video = self.visible_video(id, Some(user_id)).await?;
        if !video.is_owned_by(user_id) {
            return Err(ApiError::forbidden("You can only change your own videos"));
        }
        Ok(video)
    }

    pub async fn watch_page(&self, id: VideoId, viewer_id: Option<&str>) -> ApiResult<WatchPage> {
        let video = self.visible_video(id, viewer_id).await?;
        let owner_id = video.owner_id.as_str();

        let is_subscribed = async {
            match viewer_id {
                Some(viewer) if viewer != owner_id => {
                    self.store.is_subscribed(viewer, owner_id).await
                }
                _ => Ok(false),
            }
        };
        let (uploader, subscriber_count, is_subscribed, comments, reactions) = tokio::try_join!(
            self.store.get_user(owner_id),
            self.store.subscriber_count(owner_id),
            is_subscribed,
            self.store.list_comments(id),
            self.store
                .reaction_counts(ReactionTarget::Video(id), viewer_id),
        )?;
        let uploader =
            uploader.ok_or_else(|| ApiError::internal(format!("uploader of video {id} missing")))?;

        Ok(WatchPage {
            video,
            uploader,
            subscriber_count,
            is_subscribed,
            comments,
            reactions,
        })
    }

    /// Owner edit. A new thumbnail is uploaded first and the old blob is
    /// removed only once the row points at the new one; a failed update
    /// discards the new upload instead.
    pub async fn edit(
        &self,
        id: VideoId,
        user_id: &str,
        edit: VideoEdit,
        thumbnail: Option<NewThumbnail>,
    ) -> ApiResult<Video> {
        let edit = VideoEdit {
            title: edit.title.trim().to_string(),
            ..edit
        };
        edit.validate()?;
        let current = self.owned_video(id, user_id).await?;

        let new_thumbnail_url = match thumbnail {
            Some(thumb) if !thumb.data.is_empty() => {
                let name = format!("{}{}", Uuid::new_v4(), safe_extension(&thumb.file_name, ".jpg"));
                let url = self
                    .objects
                    .put(
                        Container::Thumbnails,
                        &name,
                        thumb.data,
                        &guess_content_type(&name),
                    )
                    .await?;
                Some(url)
            }
            _ => None,
        };

        let updated = match self
            .store
            .update_video(id, &edit, new_thumbnail_url.as_deref())
            .await
        {
            Ok(video) => video,
            Err(e) => {
                if let Some(url) = &new_thumbnail_url {
                    self.delete_blob(url).await;
                }
                return Err(e.into());
            }
        };
        if new_thumbnail_url.is_some() && !current.thumbnail_url.is_empty() {
            self.delete_blob(&current.thumbnail_url).await;
        }
        info!(video_id = %id, user_id, "Video edited");
        Ok(updated)
    }

    /// Delete the video and everything hanging off it, then its blobs.
    pub async fn delete(&self, id: VideoId, user_id: &str) -> ApiResult<()> {
        self.owned_video(id, user_id).await?;
        let deleted = self
            .store
            .delete_video_with_dependents(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Video {} not found", id)))?;

        for url in deleted.blob_urls() {
            self.delete_blob(url).await;
        }
        info!(video_id = %id, user_id, "Video deleted");
        Ok(())
    }

    async fn delete_blob(&self, url: &str) {
        if let Err(e) = self.objects.delete(url).await {
            warn!(url, error = %e, "Failed to delete blob");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yv_models::{NewVideo, Privacy};
    use yv_storage::{FsObjectStore, FsStoreConfig};
    use yv_store::{SqliteStore, UserRepo, VideoRepo};

    struct Fixture {
        service: VideoService,
        store: Arc<SqliteStore>,
        video: Video,
        old_thumbnail: std::path::PathBuf,
        blobs: tempfile::TempDir,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(SqliteStore::in_memory().await.unwrap());
        store.ensure_user("owner", "owner").await.unwrap();

        let blobs = tempfile::tempdir().unwrap();
        let objects = Arc::new(FsObjectStore::new(FsStoreConfig {
            root: blobs.path().to_path_buf(),
            base_url: "/media".to_string(),
        }));
        let old_url = objects
            .put(Container::Thumbnails, "old.jpg", b"old".to_vec(), "image/jpeg")
            .await
            .unwrap();
        let video = store
            .insert_video(&NewVideo {
                owner_id: "owner".to_string(),
                title: "ride".to_string(),
                description: String::new(),
                video_url: "/media/videos/a.mp4".to_string(),
                thumbnail_url: old_url,
                preview_url: String::new(),
                duration: "00:00:10".to_string(),
                privacy: Privacy::Public,
                ai_summary: String::new(),
            })
            .await
            .unwrap();

        Fixture {
            service: VideoService::new(store.clone(), objects),
            store,
            video,
            old_thumbnail: blobs.path().join("thumbnails/old.jpg"),
            blobs,
        }
    }

    fn rename(title: &str) -> VideoEdit {
        VideoEdit {
            title: title.to_string(),
            description: "new".to_string(),
            privacy: Privacy::Unlisted,
        }
    }

    fn cover() -> Option<NewThumbnail> {
        Some(NewThumbnail {
            file_name: "cover.png".to_string(),
            data: b"png".to_vec(),
        })
    }

    fn thumbnails(f: &Fixture) -> Vec<String> {
        std::fs::read_dir(f.blobs.path().join("thumbnails"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[tokio::test]
    async fn test_edit_swaps_thumbnail() {
        let f = fixture().await;

        let updated = f
            .service
            .edit(f.video.id, "owner", rename(" Dawn ride "), cover())
            .await
            .unwrap();

        assert_eq!(updated.title, "Dawn ride");
        assert!(updated.thumbnail_url.ends_with(".png"));
        assert!(!f.old_thumbnail.exists());
        assert_eq!(thumbnails(&f).len(), 1);
    }

    #[tokio::test]
    async fn test_failed_update_keeps_old_thumbnail() {
        let f = fixture().await;
        sqlx::query(
            "CREATE TRIGGER freeze_videos BEFORE UPDATE ON videos \
             BEGIN SELECT RAISE(ABORT, 'videos are frozen'); END",
        )
        .execute(f.store.pool())
        .await
        .unwrap();

        let result = f
            .service
            .edit(f.video.id, "owner", rename("Dawn ride"), cover())
            .await;

        assert!(result.is_err());
        assert!(f.old_thumbnail.exists());
        assert_eq!(thumbnails(&f), vec!["old.jpg".to_string()]);
        let stored = f.store.get_video(f.video.id).await.unwrap().unwrap();
        assert_eq!(stored.thumbnail_url, f.video.thumbnail_url);
    }
}
