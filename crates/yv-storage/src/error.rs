//! Object store errors.

use std::fmt::Display;

use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object store is not configured: {0}")]
    Config(String),

    /// Object names are flat file names; anything that could escape a
    /// container is refused.
    #[error("Invalid object name: {0}")]
    InvalidKey(String),

    #[error("Failed to store {key}: {reason}")]
    Put { key: String, reason: String },

    #[error("Failed to delete {key}: {reason}")]
    Delete { key: String, reason: String },

    #[error("Object store unreachable: {0}")]
    Unreachable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn put(key: impl Into<String>, reason: impl Display) -> Self {
        Self::Put {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    pub fn delete(key: impl Into<String>, reason: impl Display) -> Self {
        Self::Delete {
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}
