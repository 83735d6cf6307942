//! Pipeline error types.
//!
//! Only failures that leave no playable video end a run. Everything else is
//! reported as a degraded stage in the run's report.

use thiserror::Error;
use yv_storage::StorageError;
use yv_store::StoreError;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid upload: {0}")]
    Validation(String),

    #[error("Video could not be processed: {0}")]
    Transcode(String),

    #[error("Video upload failed: {0}")]
    Upload(#[source] StorageError),

    #[error("Saving the video failed: {0}")]
    Persist(#[source] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn transcode(msg: impl Into<String>) -> Self {
        Self::Transcode(msg.into())
    }

    /// Whether the uploader, not the server, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Transcode(_))
    }
}
