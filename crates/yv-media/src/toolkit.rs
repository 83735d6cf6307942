//! Media operations behind a trait, so the pipeline can be exercised
//! without FFmpeg installed.

use async_trait::async_trait;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

use crate::config::MediaConfig;
use crate::error::MediaResult;

/// The media operations the ingestion pipeline performs.
#[async_trait]
pub trait MediaToolkit: Send + Sync {
    /// Re-encode to web-playable MP4.
    async fn transcode(&self, input: &Path, output: &Path) -> MediaResult<()>;

    /// Duration in seconds.
    async fn probe_duration(&self, input: &Path) -> MediaResult<f64>;

    /// Silent animated preview.
    async fn preview(&self, input: &Path, output: &Path) -> MediaResult<()>;

    /// Speech-quality audio track.
    async fn extract_audio(&self, input: &Path, output: &Path) -> MediaResult<()>;

    /// Still frame thumbnail.
    async fn thumbnail(&self, input: &Path, output: &Path) -> MediaResult<()>;
}

/// [`MediaToolkit`] backed by the FFmpeg and FFprobe binaries.
#[derive(Debug, Clone, Default)]
pub struct FfmpegToolkit {
    config: MediaConfig,
}

impl FfmpegToolkit {
    pub fn new(config: MediaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MediaConfig {
        &self.config
    }
}

fn record(operation: &'static str, started: Instant, ok: bool) {
    let elapsed = started.elapsed().as_secs_f64();
    metrics::histogram!("yv_media_operation_duration_seconds", "operation" => operation)
        .record(elapsed);
    if !ok {
        metrics::counter!("yv_media_operation_failures_total", "operation" => operation)
            .increment(1);
    }
    debug!(operation, elapsed_secs = elapsed, ok, "Media operation finished");
}

#[async_trait]
impl MediaToolkit for FfmpegToolkit {
    async fn transcode(&self, input: &Path, output: &Path) -> MediaResult<()> {
        let started = Instant::now();
        let result =
            crate::transcode::transcode_for_web(input, output, self.config.transcode_timeout)
                .await;
        record("transcode", started, result.is_ok());
        result
    }

    async fn probe_duration(&self, input: &Path) -> MediaResult<f64> {
        let started = Instant::now();
        let result = crate::probe::probe_duration(input, self.config.probe_timeout).await;
        record("probe", started, result.is_ok());
        result
    }

    async fn preview(&self, input: &Path, output: &Path) -> MediaResult<()> {
        let started = Instant::now();
        let result =
            crate::preview::generate_preview(input, output, self.config.derive_timeout).await;
        record("preview", started, result.is_ok());
        result
    }

    async fn extract_audio(&self, input: &Path, output: &Path) -> MediaResult<()> {
        let started = Instant::now();
        let result =
            crate::audio::extract_audio(input, output, self.config.derive_timeout).await;
        record("audio", started, result.is_ok());
        result
    }

    async fn thumbnail(&self, input: &Path, output: &Path) -> MediaResult<()> {
        let started = Instant::now();
        let result =
            crate::thumbnail::generate_thumbnail(input, output, self.config.derive_timeout).await;
        record("thumbnail", started, result.is_ok());
        result
    }
}
