//! Per-upload scratch directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use yv_models::UploadId;

/// `<root>/<uid>/`, holding every intermediate file of one run.
#[derive(Debug, Clone)]
pub struct WorkArea {
    dir: PathBuf,
    uid: String,
}

impl WorkArea {
    pub async fn create(root: &Path, upload_id: &UploadId) -> std::io::Result<Self> {
        let dir = root.join(upload_id.as_str());
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            uid: upload_id.to_string(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file(&self, suffix: &str) -> PathBuf {
        self.dir.join(format!("{}{}", self.uid, suffix))
    }

    /// The upload as received, keeping its extension.
    pub fn raw_path(&self, extension: &str) -> PathBuf {
        self.file(&format!("_raw{extension}"))
    }

    pub fn video_path(&self) -> PathBuf {
        self.file(".mp4")
    }

    pub fn preview_path(&self) -> PathBuf {
        self.file("_preview.gif")
    }

    pub fn audio_path(&self) -> PathBuf {
        self.file(".mp3")
    }

    pub fn thumbnail_path(&self) -> PathBuf {
        self.file("_thumb.jpg")
    }

    /// Remove the directory and everything in it. Runs from `Drop`, so it is
    /// synchronous and never fails.
    pub fn remove(&self) {
        match std::fs::remove_dir_all(&self.dir) {
            Ok(()) => debug!(dir = %self.dir.display(), "Removed work area"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(dir = %self.dir.display(), error = %e, "Failed to remove work area"),
        }
    }
}
