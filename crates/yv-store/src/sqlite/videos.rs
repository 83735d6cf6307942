use async_trait::async_trait;
use tracing::{debug, info};

use yv_models::{NewVideo, Video, VideoEdit, VideoId};

use super::{video_from_row, SqliteStore, VIDEO_COLUMNS};
use crate::error::{StoreError, StoreResult};
use crate::VideoRepo;

#[async_trait]
impl VideoRepo for SqliteStore {
    async fn insert_video(&self, video: &NewVideo) -> StoreResult<Video> {
        let now = self.clock.now();
        let result = sqlx::query(
            "INSERT INTO videos (owner_id, title, description, video_url, thumbnail_url, \
             preview_url, duration, privacy, ai_summary, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&video.owner_id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.video_url)
        .bind(&video.thumbnail_url)
        .bind(&video.preview_url)
        .bind(&video.duration)
        .bind(video.privacy.code())
        .bind(&video.ai_summary)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = VideoId(result.last_insert_rowid());
        debug!(video_id = %id, owner_id = %video.owner_id, "Inserted video");
        self.get_video(id)
            .await?
            .ok_or_else(|| StoreError::not_found(format!("video {id}")))
    }

    async fn get_video(&self, id: VideoId) -> StoreResult<Option<Video>> {
        let row = sqlx::query(&format!("SELECT {VIDEO_COLUMNS} FROM videos v WHERE v.id = ?"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(video_from_row).transpose()
    }

    async fn update_video(
        &self,
        id: VideoId,
        edit: &VideoEdit,
        thumbnail_url: Option<&str>,
    ) -> StoreResult<Video> {
        let result = sqlx::query(
            "UPDATE videos SET title = ?, description = ?, privacy = ?, \
             thumbnail_url = COALESCE(?, thumbnail_url), updated_at = ? WHERE id = ?",
        )
        .bind(&edit.title)
        .bind(&edit.description)
        .bind(edit.privacy.code())
        .bind(thumbnail_url)
        .bind(self.clock.now())
        .bind(id.get())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(format!("video {id}")));
        }
        self.get_video(id)
            .await?
            .ok_or_else(|| StoreError::not_found(format!("video {id}")))
    }

    async fn delete_video_row(&self, id: VideoId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM videos WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(format!("video {id}")));
        }
        Ok(())
    }

    async fn delete_video_with_dependents(&self, id: VideoId) -> StoreResult<Option<Video>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!("SELECT {VIDEO_COLUMNS} FROM videos v WHERE v.id = ?"))
            .bind(id.get())
            .fetch_optional(&mut *tx)
            .await?;
        let Some(video) = row.as_ref().map(video_from_row).transpose()? else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM watch_history WHERE video_id = ?")
            .bind(id.get())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM playlist_videos WHERE video_id = ?")
            .bind(id.get())
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "DELETE FROM reactions WHERE video_id = ? \
             OR comment_id IN (SELECT id FROM comments WHERE video_id = ?)",
        )
        .bind(id.get())
        .bind(id.get())
        .execute(&mut *tx)
        .await?;

        // Restrictive self-reference: peel reply leaves until the thread is gone
        let mut comments = 0;
        loop {
            let removed = sqlx::query(
                "DELETE FROM comments WHERE video_id = ? AND id NOT IN \
                 (SELECT parent_id FROM comments WHERE parent_id IS NOT NULL)",
            )
            .bind(id.get())
            .execute(&mut *tx)
            .await?
            .rows_affected();
            if removed == 0 {
                break;
            }
            comments += removed;
        }

        sqlx::query("DELETE FROM videos WHERE id = ?")
            .bind(id.get())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(video_id = %id, comments, "Deleted video with dependents");
        Ok(Some(video))
    }
}
