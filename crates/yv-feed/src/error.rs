//! Feed error types.

use thiserror::Error;
use yv_store::StoreError;

pub type FeedResult<T> = Result<T, FeedError>;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl FeedError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_not_found())
    }
}
