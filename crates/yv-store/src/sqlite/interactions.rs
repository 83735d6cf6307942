use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteConnection;
use sqlx::Row;
use tracing::debug;

use yv_models::{
    Comment, CommentView, NewComment, ReactionCounts, ReactionStatus, ReactionTarget, VideoId,
    WatchHistoryEntry,
};

use super::{comment_from_row, SqliteStore, COMMENT_COLUMNS};
use crate::error::{StoreError, StoreResult};
use crate::InteractionRepo;

/// Reaction column and key for a target.
fn target_column(target: ReactionTarget) -> (&'static str, i64) {
    match target {
        ReactionTarget::Video(id) => ("video_id", id.get()),
        ReactionTarget::Comment(id) => ("comment_id", id),
    }
}

async fn counts_on(
    conn: &mut SqliteConnection,
    target: ReactionTarget,
    viewer_id: Option<&str>,
) -> StoreResult<ReactionCounts> {
    let (column, id) = target_column(target);
    let row = sqlx::query(&format!(
        "SELECT \
         COALESCE(SUM(CASE WHEN is_like = 1 THEN 1 ELSE 0 END), 0) AS likes, \
         COALESCE(SUM(CASE WHEN is_like = 0 THEN 1 ELSE 0 END), 0) AS dislikes, \
         MAX(CASE WHEN user_id = ? THEN is_like END) AS viewer \
         FROM reactions WHERE {column} = ?"
    ))
    .bind(viewer_id)
    .bind(id)
    .fetch_one(&mut *conn)
    .await?;

    let viewer: Option<i64> = row.try_get("viewer")?;
    Ok(ReactionCounts {
        likes: row.try_get("likes")?,
        dislikes: row.try_get("dislikes")?,
        status: ReactionStatus::from_is_like(viewer.map(|v| v != 0)),
    })
}

async fn latest_watch_on(
    conn: &mut SqliteConnection,
    user_id: &str,
    video_id: VideoId,
) -> StoreResult<Option<WatchHistoryEntry>> {
    let row = sqlx::query(
        "SELECT id, user_id, video_id, watched_at FROM watch_history \
         WHERE user_id = ? AND video_id = ? ORDER BY id DESC LIMIT 1",
    )
    .bind(user_id)
    .bind(video_id.get())
    .fetch_optional(&mut *conn)
    .await?;

    row.map(|row| -> StoreResult<WatchHistoryEntry> {
        Ok(WatchHistoryEntry {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            video_id: VideoId(row.try_get("video_id")?),
            watched_at: row.try_get("watched_at")?,
        })
    })
    .transpose()
}

async fn subscriber_count_on(conn: &mut SqliteConnection, creator_id: &str) -> StoreResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE creator_id = ?")
        .bind(creator_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}

#[async_trait]
impl InteractionRepo for SqliteStore {
    async fn latest_watch(
        &self,
        user_id: &str,
        video_id: VideoId,
    ) -> StoreResult<Option<WatchHistoryEntry>> {
        let mut conn = self.pool.acquire().await?;
        latest_watch_on(&mut conn, user_id, video_id).await
    }

    async fn record_watch(
        &self,
        user_id: &str,
        video_id: VideoId,
        at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let latest = latest_watch_on(&mut tx, user_id, video_id).await?;
        if latest.is_some_and(|entry| !entry.allows_new_view_at(at)) {
            return Ok(false);
        }

        sqlx::query("INSERT INTO watch_history (user_id, video_id, watched_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(video_id.get())
            .bind(at)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!(user_id, video_id = %video_id, "Recorded view");
        Ok(true)
    }

    async fn toggle_reaction(
        &self,
        user_id: &str,
        target: ReactionTarget,
        is_like: bool,
    ) -> StoreResult<ReactionCounts> {
        let (column, id) = target_column(target);
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query(&format!(
            "SELECT id, is_like FROM reactions WHERE user_id = ? AND {column} = ?"
        ))
        .bind(user_id)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        match existing {
            None => {
                sqlx::query(&format!(
                    "INSERT INTO reactions (user_id, {column}, is_like, created_at) \
                     VALUES (?, ?, ?, ?)"
                ))
                .bind(user_id)
                .bind(id)
                .bind(is_like)
                .bind(self.clock.now())
                .execute(&mut *tx)
                .await?;
            }
            Some(row) => {
                let reaction_id: i64 = row.try_get("id")?;
                let current: bool = row.try_get("is_like")?;
                if current == is_like {
                    sqlx::query("DELETE FROM reactions WHERE id = ?")
                        .bind(reaction_id)
                        .execute(&mut *tx)
                        .await?;
                } else {
                    sqlx::query("UPDATE reactions SET is_like = ? WHERE id = ?")
                        .bind(is_like)
                        .bind(reaction_id)
                        .execute(&mut *tx)
                        .await?;
                }
            }
        }

        let counts = counts_on(&mut tx, target, Some(user_id)).await?;
        tx.commit().await?;
        Ok(counts)
    }

    async fn reaction_counts(
        &self,
        target: ReactionTarget,
        viewer_id: Option<&str>,
    ) -> StoreResult<ReactionCounts> {
        let mut conn = self.pool.acquire().await?;
        counts_on(&mut conn, target, viewer_id).await
    }

    async fn is_subscribed(&self, follower_id: &str, creator_id: &str) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM subscriptions WHERE follower_id = ? AND creator_id = ?)",
        )
        .bind(follower_id)
        .bind(creator_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn toggle_subscription(
        &self,
        follower_id: &str,
        creator_id: &str,
    ) -> StoreResult<(bool, i64)> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM subscriptions WHERE follower_id = ? AND creator_id = ?")
            .bind(follower_id)
            .bind(creator_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if removed == 0 {
            sqlx::query(
                "INSERT INTO subscriptions (follower_id, creator_id, created_at) VALUES (?, ?, ?)",
            )
            .bind(follower_id)
            .bind(creator_id)
            .bind(self.clock.now())
            .execute(&mut *tx)
            .await?;
        }

        let count = subscriber_count_on(&mut tx, creator_id).await?;
        tx.commit().await?;
        Ok((removed == 0, count))
    }

    async fn subscriber_count(&self, creator_id: &str) -> StoreResult<i64> {
        let mut conn = self.pool.acquire().await?;
        subscriber_count_on(&mut conn, creator_id).await
    }

    async fn add_comment(&self, comment: &NewComment) -> StoreResult<Comment> {
        let mut tx = self.pool.begin().await?;

        if let Some(parent_id) = comment.parent_id {
            let parent_video: Option<i64> =
                sqlx::query_scalar("SELECT video_id FROM comments WHERE id = ?")
                    .bind(parent_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            if parent_video != Some(comment.video_id.get()) {
                return Err(StoreError::not_found(format!(
                    "comment {parent_id} on video {}",
                    comment.video_id
                )));
            }
        }

        let id = sqlx::query(
            "INSERT INTO comments (video_id, author_id, parent_id, content, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(comment.video_id.get())
        .bind(&comment.author_id)
        .bind(comment.parent_id)
        .bind(comment.content.trim())
        .bind(self.clock.now())
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        let row = sqlx::query(&format!("SELECT {COMMENT_COLUMNS} FROM comments c WHERE c.id = ?"))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        let created = comment_from_row(&row)?;
        tx.commit().await?;
        Ok(created)
    }

    async fn get_comment(&self, id: i64) -> StoreResult<Option<Comment>> {
        let row = sqlx::query(&format!("SELECT {COMMENT_COLUMNS} FROM comments c WHERE c.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(comment_from_row).transpose()
    }

    async fn list_comments(&self, video_id: VideoId) -> StoreResult<Vec<CommentView>> {
        let rows = sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS}, u.username AS author_name, \
             (SELECT COUNT(*) FROM reactions r WHERE r.comment_id = c.id AND r.is_like = 1) AS likes, \
             (SELECT COUNT(*) FROM reactions r WHERE r.comment_id = c.id AND r.is_like = 0) AS dislikes \
             FROM comments c JOIN users u ON u.id = c.author_id \
             WHERE c.video_id = ? ORDER BY c.id ASC"
        ))
        .bind(video_id.get())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> StoreResult<CommentView> {
                Ok(CommentView {
                    comment: comment_from_row(row)?,
                    author_name: row.try_get("author_name")?,
                    likes: row.try_get("likes")?,
                    dislikes: row.try_get("dislikes")?,
                })
            })
            .collect()
    }

    async fn delete_comment_with_dependents(&self, id: i64) -> StoreResult<u64> {
        let mut tx = self.pool.begin().await?;

        let ids: Vec<i64> = sqlx::query_scalar(
            "WITH RECURSIVE thread (id, depth) AS ( \
                 SELECT id, 0 FROM comments WHERE id = ? \
                 UNION ALL \
                 SELECT c.id, t.depth + 1 FROM comments c JOIN thread t ON c.parent_id = t.id \
             ) \
             SELECT id FROM thread ORDER BY depth DESC, id DESC",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        if ids.is_empty() {
            return Err(StoreError::not_found(format!("comment {id}")));
        }

        // Deepest replies first so no parent outlives its children
        for &comment_id in &ids {
            sqlx::query("DELETE FROM reactions WHERE comment_id = ?")
                .bind(comment_id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("DELETE FROM comments WHERE id = ?")
                .bind(comment_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        debug!(comment_id = id, removed = ids.len(), "Deleted comment thread");
        Ok(ids.len() as u64)
    }
}
