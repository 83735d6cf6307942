//! Store error types.

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique index violation
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Foreign key or check constraint violation
    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl StoreError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::Corrupt(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// SQLite's `SQLITE_CONSTRAINT_TRIGGER`, raised when an `ON DELETE RESTRICT`
/// action blocks a delete. sqlx only recognises 787 as a foreign key error.
const SQLITE_RESTRICT_BLOCKED: &str = "1811";

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error() {
            if db.is_unique_violation() {
                return Self::Conflict(db.message().to_string());
            }
            if db.is_foreign_key_violation()
                || db.is_check_violation()
                || db.code().as_deref() == Some(SQLITE_RESTRICT_BLOCKED)
            {
                return Self::Constraint(db.message().to_string());
            }
        }
        match e {
            sqlx::Error::RowNotFound => Self::NotFound("row".to_string()),
            other => Self::Database(other),
        }
    }
}
