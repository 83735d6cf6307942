use async_trait::async_trait;
use sqlx::Row;
use tracing::debug;

use yv_models::{Playlist, PlaylistDetails, PlaylistEntry, PlaylistMembership, VideoId};

use super::{card_from_row, playlist_from_row, SqliteStore, CARD_COLUMNS, PLAYLIST_COLUMNS};
use crate::error::{StoreError, StoreResult};
use crate::PlaylistRepo;

#[async_trait]
impl PlaylistRepo for SqliteStore {
    async fn create_playlist(
        &self,
        owner_id: &str,
        name: &str,
        description: &str,
    ) -> StoreResult<Playlist> {
        let id = sqlx::query(
            "INSERT INTO playlists (owner_id, name, description, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(owner_id)
        .bind(name)
        .bind(description)
        .bind(self.clock.now())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        debug!(playlist_id = id, owner_id, "Created playlist");
        self.get_playlist(id)
            .await?
            .ok_or_else(|| StoreError::not_found(format!("playlist {id}")))
    }

    async fn get_playlist(&self, id: i64) -> StoreResult<Option<Playlist>> {
        let row = sqlx::query(&format!(
            "SELECT {PLAYLIST_COLUMNS} FROM playlists p WHERE p.id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(playlist_from_row).transpose()
    }

    async fn rename_playlist(&self, id: i64, name: &str) -> StoreResult<Playlist> {
        let result = sqlx::query("UPDATE playlists SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(format!("playlist {id}")));
        }
        self.get_playlist(id)
            .await?
            .ok_or_else(|| StoreError::not_found(format!("playlist {id}")))
    }

    async fn delete_playlist_with_links(&self, id: i64) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM playlist_videos WHERE playlist_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let removed = sqlx::query("DELETE FROM playlists WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if removed == 0 {
            return Err(StoreError::not_found(format!("playlist {id}")));
        }
        tx.commit().await?;
        Ok(())
    }

    async fn toggle_playlist_video(
        &self,
        playlist_id: i64,
        video_id: VideoId,
    ) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let removed =
            sqlx::query("DELETE FROM playlist_videos WHERE playlist_id = ? AND video_id = ?")
                .bind(playlist_id)
                .bind(video_id.get())
                .execute(&mut *tx)
                .await?
                .rows_affected();

        if removed == 0 {
            sqlx::query(
                "INSERT INTO playlist_videos (playlist_id, video_id, added_at) VALUES (?, ?, ?)",
            )
            .bind(playlist_id)
            .bind(video_id.get())
            .bind(self.clock.now())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(removed == 0)
    }

    async fn remove_playlist_video(
        &self,
        playlist_id: i64,
        video_id: VideoId,
    ) -> StoreResult<bool> {
        let removed =
            sqlx::query("DELETE FROM playlist_videos WHERE playlist_id = ? AND video_id = ?")
                .bind(playlist_id)
                .bind(video_id.get())
                .execute(&self.pool)
                .await?
                .rows_affected();
        Ok(removed > 0)
    }

    async fn list_playlists(
        &self,
        owner_id: &str,
        video_id: Option<VideoId>,
    ) -> StoreResult<Vec<PlaylistMembership>> {
        let rows = sqlx::query(&format!(
            "SELECT {PLAYLIST_COLUMNS}, \
             (SELECT COUNT(*) FROM playlist_videos pv WHERE pv.playlist_id = p.id) AS video_count, \
             EXISTS (SELECT 1 FROM playlist_videos pv \
                     WHERE pv.playlist_id = p.id AND pv.video_id = ?) AS contains_video \
             FROM playlists p WHERE p.owner_id = ? ORDER BY p.id DESC"
        ))
        .bind(video_id.map(VideoId::get))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> StoreResult<PlaylistMembership> {
                Ok(PlaylistMembership {
                    playlist: playlist_from_row(row)?,
                    video_count: row.try_get("video_count")?,
                    contains_video: row.try_get("contains_video")?,
                })
            })
            .collect()
    }

    async fn playlist_details(&self, id: i64) -> StoreResult<Option<PlaylistDetails>> {
        let row = sqlx::query(&format!(
            "SELECT {PLAYLIST_COLUMNS}, u.username AS owner_name \
             FROM playlists p JOIN users u ON u.id = p.owner_id WHERE p.id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let playlist = playlist_from_row(&row)?;
        let owner_name: String = row.try_get("owner_name")?;

        // Other owners' private videos stay hidden even inside the playlist
        let rows = sqlx::query(&format!(
            "SELECT pv.added_at, {CARD_COLUMNS} FROM playlist_videos pv \
             JOIN videos v ON v.id = pv.video_id JOIN users u ON u.id = v.owner_id \
             WHERE pv.playlist_id = ? AND (v.privacy <> 1 OR v.owner_id = ?) \
             ORDER BY pv.rowid DESC"
        ))
        .bind(id)
        .bind(&playlist.owner_id)
        .fetch_all(&self.pool)
        .await?;

        let videos = rows
            .iter()
            .map(|row| -> StoreResult<PlaylistEntry> {
                Ok(PlaylistEntry {
                    added_at: row.try_get("added_at")?,
                    video: card_from_row(row)?,
                })
            })
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(Some(PlaylistDetails {
            playlist,
            owner_name,
            videos,
        }))
    }
}
