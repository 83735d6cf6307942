//! Media tool errors.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub type MediaResult<T> = Result<T, MediaError>;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("{0} is not installed or not on PATH")]
    MissingTool(&'static str),

    /// ffmpeg ran and rejected the input. `stderr` keeps the last lines
    /// that were not progress output.
    #[error("ffmpeg failed: {message}")]
    Encode {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("ffprobe failed: {message}")]
    Probe {
        message: String,
        stderr: Option<String>,
    },

    #[error("No such media file: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("{tool} gave up after {}s", .after.as_secs())]
    TimedOut { tool: &'static str, after: Duration },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unreadable ffprobe output: {0}")]
    ProbeOutput(#[from] serde_json::Error),

    #[error("Not a playable video: {0}")]
    Unplayable(String),

    #[error("No audio stream in {}", .0.display())]
    NoAudioStream(PathBuf),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MediaError {
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::Encode {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    pub fn ffprobe_failed(message: impl Into<String>, stderr: Option<String>) -> Self {
        Self::Probe {
            message: message.into(),
            stderr,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}
