use async_trait::async_trait;
use sqlx::{QueryBuilder, Row, Sqlite};

use yv_models::{HistoryItem, LikedVideo, VideoCard};

use super::{card_from_row, like_pattern, SqliteStore, CARD_COLUMNS};
use crate::error::StoreResult;
use crate::ListingRepo;

// Privacy codes as stored
const PUBLIC: i64 = 0;
const PRIVATE: i64 = 1;

#[async_trait]
impl ListingRepo for SqliteStore {
    async fn list_public_videos(
        &self,
        cursor: Option<i64>,
        limit: usize,
    ) -> StoreResult<Vec<VideoCard>> {
        let rows = sqlx::query(&format!(
            "SELECT {CARD_COLUMNS} FROM videos v JOIN users u ON u.id = v.owner_id \
             WHERE v.privacy = ? AND (? IS NULL OR v.id < ?) \
             ORDER BY v.id DESC LIMIT ?"
        ))
        .bind(PUBLIC)
        .bind(cursor)
        .bind(cursor)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(card_from_row).collect()
    }

    async fn list_owner_videos(
        &self,
        owner_id: &str,
        include_non_public: bool,
        cursor: Option<i64>,
        limit: usize,
    ) -> StoreResult<Vec<VideoCard>> {
        let rows = sqlx::query(&format!(
            "SELECT {CARD_COLUMNS} FROM videos v JOIN users u ON u.id = v.owner_id \
             WHERE v.owner_id = ? AND (? OR v.privacy = ?) AND (? IS NULL OR v.id < ?) \
             ORDER BY v.id DESC LIMIT ?"
        ))
        .bind(owner_id)
        .bind(include_non_public)
        .bind(PUBLIC)
        .bind(cursor)
        .bind(cursor)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(card_from_row).collect()
    }

    async fn list_history(
        &self,
        user_id: &str,
        cursor: Option<i64>,
        limit: usize,
    ) -> StoreResult<Vec<HistoryItem>> {
        let rows = sqlx::query(&format!(
            "SELECT h.id AS history_id, h.watched_at, {CARD_COLUMNS} FROM watch_history h \
             JOIN videos v ON v.id = h.video_id JOIN users u ON u.id = v.owner_id \
             WHERE h.user_id = ? AND (v.privacy <> ? OR v.owner_id = h.user_id) \
             AND (? IS NULL OR h.id < ?) \
             ORDER BY h.id DESC LIMIT ?"
        ))
        .bind(user_id)
        .bind(PRIVATE)
        .bind(cursor)
        .bind(cursor)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> StoreResult<HistoryItem> {
                Ok(HistoryItem {
                    history_id: row.try_get("history_id")?,
                    watched_at: row.try_get("watched_at")?,
                    video: card_from_row(row)?,
                })
            })
            .collect()
    }

    async fn list_liked(
        &self,
        user_id: &str,
        cursor: Option<i64>,
        limit: usize,
    ) -> StoreResult<Vec<LikedVideo>> {
        let rows = sqlx::query(&format!(
            "SELECT r.id AS reaction_id, r.created_at AS liked_at, {CARD_COLUMNS} \
             FROM reactions r JOIN videos v ON v.id = r.video_id \
             JOIN users u ON u.id = v.owner_id \
             WHERE r.user_id = ? AND r.is_like = 1 \
             AND (v.privacy <> ? OR v.owner_id = r.user_id) \
             AND (? IS NULL OR r.id < ?) \
             ORDER BY r.id DESC LIMIT ?"
        ))
        .bind(user_id)
        .bind(PRIVATE)
        .bind(cursor)
        .bind(cursor)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> StoreResult<LikedVideo> {
                Ok(LikedVideo {
                    reaction_id: row.try_get("reaction_id")?,
                    liked_at: row.try_get("liked_at")?,
                    video: card_from_row(row)?,
                })
            })
            .collect()
    }

    async fn search_videos(
        &self,
        terms: &[String],
        cursor: Option<i64>,
        limit: usize,
    ) -> StoreResult<Vec<VideoCard>> {
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {CARD_COLUMNS} FROM videos v JOIN users u ON u.id = v.owner_id \
             WHERE v.privacy = "
        ));
        qb.push_bind(PUBLIC);
        for term in terms {
            let pattern = like_pattern(term);
            qb.push(" AND (lower(v.title) LIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" ESCAPE '\\' OR lower(v.description) LIKE ");
            qb.push_bind(pattern);
            qb.push(" ESCAPE '\\')");
        }
        if let Some(cursor) = cursor {
            qb.push(" AND v.id < ");
            qb.push_bind(cursor);
        }
        qb.push(" ORDER BY v.id DESC LIMIT ");
        qb.push_bind(limit as i64);

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(card_from_row).collect()
    }

    async fn subscribed_unwatched(
        &self,
        viewer_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<VideoCard>> {
        let rows = sqlx::query(&format!(
            "SELECT {CARD_COLUMNS} FROM videos v JOIN users u ON u.id = v.owner_id \
             WHERE v.privacy = ? \
             AND v.owner_id IN (SELECT creator_id FROM subscriptions WHERE follower_id = ?) \
             AND v.id NOT IN (SELECT video_id FROM watch_history WHERE user_id = ?) \
             ORDER BY v.id DESC LIMIT ?"
        ))
        .bind(PUBLIC)
        .bind(viewer_id)
        .bind(viewer_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(card_from_row).collect()
    }

    async fn trending(&self, limit: usize) -> StoreResult<Vec<VideoCard>> {
        let rows = sqlx::query(&format!(
            "SELECT {CARD_COLUMNS}, COUNT(c.id) AS comment_count \
             FROM videos v JOIN users u ON u.id = v.owner_id \
             LEFT JOIN comments c ON c.video_id = v.id \
             WHERE v.privacy = ? \
             GROUP BY v.id \
             ORDER BY comment_count DESC, v.id DESC LIMIT ?"
        ))
        .bind(PUBLIC)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(card_from_row).collect()
    }
}
