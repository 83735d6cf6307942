use async_trait::async_trait;
use sqlx::{QueryBuilder, Row, Sqlite};
use tracing::debug;

use yv_models::{ProfileUpdate, User};

use super::{like_pattern, user_from_row, SqliteStore, USER_COLUMNS};
use crate::error::{StoreError, StoreResult};
use crate::UserRepo;

#[async_trait]
impl UserRepo for SqliteStore {
    async fn ensure_user(&self, id: &str, username: &str) -> StoreResult<User> {
        let result = sqlx::query(
            "INSERT INTO users (id, username, created_at) VALUES (?, ?, ?) \
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(id)
        .bind(username)
        .bind(self.clock.now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            debug!(user_id = id, username, "Created user");
        }

        self.get_user(id)
            .await?
            .ok_or_else(|| StoreError::not_found(format!("user {id}")))
    }

    async fn get_user(&self, id: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn update_profile(&self, id: &str, update: &ProfileUpdate) -> StoreResult<User> {
        let result = sqlx::query(
            "UPDATE users SET first_name = ?, last_name = ?, bio = ? WHERE id = ?",
        )
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.bio)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(format!("user {id}")));
        }
        self.get_user(id)
            .await?
            .ok_or_else(|| StoreError::not_found(format!("user {id}")))
    }

    async fn set_profile_picture(&self, id: &str, url: &str) -> StoreResult<Option<String>> {
        let mut tx = self.pool.begin().await?;

        let previous: Option<String> =
            sqlx::query("SELECT profile_picture_url FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .map(|row| row.try_get("profile_picture_url"))
                .transpose()?;
        let Some(previous) = previous else {
            return Err(StoreError::not_found(format!("user {id}")));
        };

        sqlx::query("UPDATE users SET profile_picture_url = ? WHERE id = ?")
            .bind(url)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok((!previous.is_empty()).then_some(previous))
    }

    async fn set_premium(&self, id: &str, premium: bool) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE users SET is_premium = ? WHERE id = ?")
            .bind(premium)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn search_users(&self, terms: &[String], limit: usize) -> StoreResult<Vec<User>> {
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users WHERE 1 = 1"));
        for term in terms {
            qb.push(" AND lower(username) LIKE ");
            qb.push_bind(like_pattern(term));
            qb.push(" ESCAPE '\\'");
        }
        qb.push(" ORDER BY username LIMIT ");
        qb.push_bind(limit as i64);

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(user_from_row).collect()
    }
}
