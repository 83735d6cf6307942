//! SQLite implementation of the store traits.

mod interactions;
mod listings;
mod playlists;
mod users;
mod videos;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::Row;
use tracing::info;

use yv_models::{Clock, Comment, Playlist, Privacy, SystemClock, User, Video, VideoCard, VideoId};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::schema::SCHEMA;
use crate::Store;

const USER_COLUMNS: &str =
    "id, username, first_name, last_name, bio, profile_picture_url, is_premium, created_at";

const VIDEO_COLUMNS: &str = "v.id, v.owner_id, v.title, v.description, v.video_url, \
     v.thumbnail_url, v.preview_url, v.duration, v.privacy, v.ai_summary, v.created_at, \
     v.updated_at";

/// Listing card columns. Requires `videos v JOIN users u ON u.id = v.owner_id`.
const CARD_COLUMNS: &str = "v.id, v.owner_id, u.username AS owner_name, v.title, \
     v.thumbnail_url, v.preview_url, v.duration, v.privacy, v.created_at";

const COMMENT_COLUMNS: &str = "c.id, c.video_id, c.author_id, c.parent_id, c.content, c.created_at";

const PLAYLIST_COLUMNS: &str = "p.id, p.owner_id, p.name, p.description, p.created_at";

/// sqlx-backed store.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl SqliteStore {
    /// Connect to the configured database and apply the schema.
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(&config.database_url)
            .map_err(|e| StoreError::Config(e.to_string()))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        let store = Self::from_pool(pool, Arc::new(SystemClock));
        store.migrate().await?;
        info!(url = %config.database_url, "Connected to database");
        Ok(store)
    }

    /// Private in-memory database. Tests use this.
    pub async fn in_memory() -> StoreResult<Self> {
        Self::in_memory_with_clock(Arc::new(SystemClock)).await
    }

    pub async fn in_memory_with_clock(clock: Arc<dyn Clock>) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StoreError::Config(e.to_string()))?
            .foreign_keys(true);

        // One connection that never closes: the database lives in it
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self::from_pool(pool, clock);
        store.migrate().await?;
        Ok(store)
    }

    pub fn from_pool(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn migrate(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// `%term%` LIKE pattern, lowercased, with wildcards escaped by `\`.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn privacy_from_code(code: i64) -> StoreResult<Privacy> {
    Privacy::from_code(code).ok_or_else(|| StoreError::corrupt(format!("privacy code {code}")))
}

fn user_from_row(row: &SqliteRow) -> StoreResult<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        bio: row.try_get("bio")?,
        profile_picture_url: row.try_get("profile_picture_url")?,
        is_premium: row.try_get("is_premium")?,
        created_at: row.try_get("created_at")?,
    })
}

fn video_from_row(row: &SqliteRow) -> StoreResult<Video> {
    Ok(Video {
        id: VideoId(row.try_get("id")?),
        owner_id: row.try_get("owner_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        video_url: row.try_get("video_url")?,
        thumbnail_url: row.try_get("thumbnail_url")?,
        preview_url: row.try_get("preview_url")?,
        duration: row.try_get("duration")?,
        privacy: privacy_from_code(row.try_get("privacy")?)?,
        ai_summary: row.try_get("ai_summary")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn card_from_row(row: &SqliteRow) -> StoreResult<VideoCard> {
    Ok(VideoCard {
        id: VideoId(row.try_get("id")?),
        owner_id: row.try_get("owner_id")?,
        owner_name: row.try_get("owner_name")?,
        title: row.try_get("title")?,
        thumbnail_url: row.try_get("thumbnail_url")?,
        preview_url: row.try_get("preview_url")?,
        duration: row.try_get("duration")?,
        privacy: privacy_from_code(row.try_get("privacy")?)?,
        created_at: row.try_get("created_at")?,
    })
}

fn comment_from_row(row: &SqliteRow) -> StoreResult<Comment> {
    Ok(Comment {
        id: row.try_get("id")?,
        video_id: VideoId(row.try_get("video_id")?),
        author_id: row.try_get("author_id")?,
        parent_id: row.try_get("parent_id")?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
    })
}

fn playlist_from_row(row: &SqliteRow) -> StoreResult<Playlist> {
    Ok(Playlist {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Cat"), "%cat%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
    }

    #[tokio::test]
    async fn test_schema_is_idempotent() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.migrate().await.unwrap();
        store.ping().await.unwrap();
    }
}
