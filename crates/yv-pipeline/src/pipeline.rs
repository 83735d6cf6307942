//! Upload ingestion.
//!
//! A run writes the upload to a scratch area, transcodes it, derives the
//! duration, preview, AI summary and thumbnail concurrently, uploads the
//! artifacts and saves the video row. Only the transcode, the main video
//! upload and the final save can fail a run; every other stage degrades to
//! an empty or placeholder value.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{warn, Instrument};
use validator::Validate;

use yv_ai::{AiError, SpeechToText, Summarizer};
use yv_media::MediaToolkit;
use yv_models::encoding::UNKNOWN_DURATION;
use yv_models::{format_duration, summary, NewVideo, Privacy, UploadId, Video};
use yv_storage::{guess_content_type, Container, ObjectStore};
use yv_store::VideoRepo;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::logging::PipelineLogger;
use crate::outcome::{PipelineReport, Stage, StageOutcome};
use crate::work_area::WorkArea;

/// Uploader-supplied thumbnail.
#[derive(Debug, Clone)]
pub struct ThumbnailUpload {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// One video upload as received from the client.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub privacy: Privacy,
    pub file_name: String,
    pub data: Vec<u8>,
    pub thumbnail: Option<ThumbnailUpload>,
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub video: Video,
    pub report: PipelineReport,
}

/// File extension including the dot, lowercased. Anything unusual falls
/// back to `default`.
pub fn safe_extension(file_name: &str, default: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 5 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_else(|| default.to_string())
}

async fn with_timeout<T, E, F>(limit: Duration, what: &str, fut: F) -> Result<T, String>
where
    F: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!("{what} timed out after {}s", limit.as_secs())),
    }
}

/// Audio, transcription and summary, chained.
struct Description {
    text: String,
    audio: StageOutcome<()>,
    transcription: Option<StageOutcome<()>>,
    summary: Option<StageOutcome<()>>,
}

/// Runs uploads end to end.
pub struct UploadPipeline<V: ?Sized> {
    media: Arc<dyn MediaToolkit>,
    storage: Arc<dyn ObjectStore>,
    speech: Arc<dyn SpeechToText>,
    summarizer: Arc<dyn Summarizer>,
    videos: Arc<V>,
    config: PipelineConfig,
}

impl<V> UploadPipeline<V>
where
    V: VideoRepo + ?Sized,
{
    pub fn new(
        media: Arc<dyn MediaToolkit>,
        storage: Arc<dyn ObjectStore>,
        speech: Arc<dyn SpeechToText>,
        summarizer: Arc<dyn Summarizer>,
        videos: Arc<V>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            media,
            storage,
            speech,
            summarizer,
            videos,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Ingest one upload. Dropping the returned future cancels the run and
    /// still removes its work area.
    pub async fn run(&self, request: UploadRequest) -> PipelineResult<PipelineOutput> {
        validate(&request)?;

        let upload_id = UploadId::new();
        let logger = PipelineLogger::new(&upload_id, "upload");
        let span = logger.create_span();

        let started = Instant::now();
        let result = self
            .run_inner(&upload_id, &logger, request)
            .instrument(span)
            .await;

        let elapsed = started.elapsed();
        let status = if result.is_ok() { "ok" } else { "failed" };
        metrics::histogram!("yv_pipeline_duration_seconds", "result" => status)
            .record(elapsed.as_secs_f64());
        metrics::counter!("yv_pipeline_runs_total", "result" => status).increment(1);

        result.map(|mut output| {
            output.report.elapsed_ms = elapsed.as_millis() as u64;
            logger.log_completion(&format!(
                "video {} saved in {}ms ({} degraded stages)",
                output.video.id,
                output.report.elapsed_ms,
                output.report.degraded().count()
            ));
            output
        })
    }

    async fn run_inner(
        &self,
        upload_id: &UploadId,
        logger: &PipelineLogger,
        mut request: UploadRequest,
    ) -> PipelineResult<PipelineOutput> {
        // A zero-byte cover counts as none, so one gets generated
        let custom_thumbnail = request.thumbnail.take().filter(|t| !t.data.is_empty());
        logger.log_start(&format!(
            "{} ({} bytes) for {}",
            request.file_name,
            request.data.len(),
            request.owner_id
        ));

        let area = WorkArea::create(&self.config.work_dir, upload_id).await?;
        let area = scopeguard::guard(area, |area| area.remove());
        let mut report = PipelineReport::new(upload_id.clone());
        let uid = upload_id.as_str();

        // Raw upload
        let raw_path = area.raw_path(&safe_extension(&request.file_name, ".mp4"));
        tokio::fs::write(&raw_path, &request.data).await?;

        // Transcode: the only fatal media stage
        let video_path = area.video_path();
        if let Err(e) = self.media.transcode(&raw_path, &video_path).await {
            logger.log_error(&format!("transcode failed: {e}"));
            return Err(PipelineError::transcode(e.to_string()));
        }
        let transcoded = StageOutcome::Done(());
        logger.log_stage(Stage::Transcode, &transcoded);
        report.record(Stage::Transcode, &transcoded);

        // Everything below only reads the transcoded file
        let preview_path = area.preview_path();
        let audio_path = area.audio_path();
        let thumbnail_path = area.thumbnail_path();
        let wants_thumbnail = custom_thumbnail.is_none();

        let (probe, preview, description, thumbnail) = tokio::join!(
            async {
                StageOutcome::from_result(self.media.probe_duration(&video_path).await)
            },
            async {
                StageOutcome::from_result(self.media.preview(&video_path, &preview_path).await)
            },
            self.describe(&video_path, &audio_path),
            async {
                if wants_thumbnail {
                    Some(StageOutcome::from_result(
                        self.media.thumbnail(&video_path, &thumbnail_path).await,
                    ))
                } else {
                    None
                }
            },
        );

        logger.log_stage(Stage::Probe, &probe);
        report.record(Stage::Probe, &probe);
        logger.log_stage(Stage::Preview, &preview);
        report.record(Stage::Preview, &preview);
        for (stage, outcome) in [
            (Stage::Audio, Some(&description.audio)),
            (Stage::Transcription, description.transcription.as_ref()),
            (Stage::Summary, description.summary.as_ref()),
        ] {
            if let Some(outcome) = outcome {
                logger.log_stage(stage, outcome);
                report.record(stage, outcome);
            }
        }
        if let Some(outcome) = &thumbnail {
            logger.log_stage(Stage::Thumbnail, outcome);
            report.record(Stage::Thumbnail, outcome);
        }

        let duration = probe
            .ok()
            .map(format_duration)
            .unwrap_or_else(|| UNKNOWN_DURATION.to_string());

        // Main video upload: without it there is nothing to play
        let video_url = with_timeout(
            self.config.upload_timeout,
            "video upload",
            self.storage.put_file(
                Container::Videos,
                &format!("{uid}.mp4"),
                &video_path,
                "video/mp4",
            ),
        )
        .await
        .map_err(|e| {
            logger.log_error(&format!("video upload failed: {e}"));
            PipelineError::Upload(yv_storage::StorageError::put(format!("{uid}.mp4"), e))
        })?;
        let uploaded = StageOutcome::Done(());
        logger.log_stage(Stage::VideoUpload, &uploaded);
        report.record(Stage::VideoUpload, &uploaded);

        let (thumbnail_upload, preview_upload) = tokio::join!(
            async {
                match (&custom_thumbnail, thumbnail.as_ref().map(StageOutcome::is_done)) {
                    (Some(custom), _) => {
                        let name = format!("{uid}{}", safe_extension(&custom.file_name, ".jpg"));
                        let content_type = guess_content_type(&name);
                        Some(StageOutcome::from_result(
                            with_timeout(
                                self.config.upload_timeout,
                                "thumbnail upload",
                                self.storage.put(
                                    Container::Thumbnails,
                                    &name,
                                    custom.data.clone(),
                                    &content_type,
                                ),
                            )
                            .await,
                        ))
                    }
                    (None, Some(true)) => Some(StageOutcome::from_result(
                        with_timeout(
                            self.config.upload_timeout,
                            "thumbnail upload",
                            self.storage.put_file(
                                Container::Thumbnails,
                                &format!("{uid}_thumb.jpg"),
                                &thumbnail_path,
                                "image/jpeg",
                            ),
                        )
                        .await,
                    )),
                    _ => None,
                }
            },
            async {
                if !preview.is_done() {
                    return None;
                }
                Some(StageOutcome::from_result(
                    with_timeout(
                        self.config.upload_timeout,
                        "preview upload",
                        self.storage.put_file(
                            Container::Previews,
                            &format!("{uid}_preview.gif"),
                            &preview_path,
                            "image/gif",
                        ),
                    )
                    .await,
                ))
            },
        );

        let mut blob_urls = vec![video_url.clone()];
        let mut take_url = |stage: Stage, outcome: Option<StageOutcome<String>>| -> String {
            let Some(outcome) = outcome else {
                return String::new();
            };
            logger.log_stage(stage, &outcome);
            report.record(stage, &outcome);
            match outcome.ok() {
                Some(url) => {
                    blob_urls.push(url.clone());
                    url
                }
                None => String::new(),
            }
        };
        let thumbnail_url = take_url(Stage::ThumbnailUpload, thumbnail_upload);
        let preview_url = take_url(Stage::PreviewUpload, preview_upload);

        let new_video = NewVideo {
            owner_id: request.owner_id,
            title: request.title.trim().to_string(),
            description: request.description,
            video_url,
            thumbnail_url,
            preview_url,
            duration,
            privacy: request.privacy,
            ai_summary: description.text,
        };

        let video = match self.videos.insert_video(&new_video).await {
            Ok(video) => video,
            Err(e) => {
                logger.log_error(&format!("saving video failed: {e}"));
                self.discard_blobs(logger, &blob_urls).await;
                return Err(PipelineError::Persist(e));
            }
        };
        let persisted = StageOutcome::Done(());
        logger.log_stage(Stage::Persist, &persisted);
        report.record(Stage::Persist, &persisted);

        Ok(PipelineOutput { video, report })
    }

    /// Extract audio, transcribe it and summarize the transcript. The text is
    /// the summary, or a placeholder naming the stage that failed.
    async fn describe(&self, video_path: &Path, audio_path: &Path) -> Description {
        let audio = StageOutcome::from_result(self.media.extract_audio(video_path, audio_path).await);
        if !audio.is_done() {
            return Description {
                text: summary::NO_AUDIO.to_string(),
                audio,
                transcription: None,
                summary: None,
            };
        }

        let transcript = match tokio::time::timeout(
            self.config.ai_timeout,
            self.speech.transcribe(audio_path),
        )
        .await
        {
            Ok(Ok(Some(text))) if !text.trim().is_empty() => Ok(text),
            Ok(Ok(_)) => Err((summary::TRANSCRIPTION_FAILED, "no speech recognised".to_string())),
            Ok(Err(AiError::NotConfigured)) => {
                Err((summary::SUMMARY_UNAVAILABLE, AiError::NotConfigured.to_string()))
            }
            Ok(Err(e)) => Err((summary::TRANSCRIPTION_FAILED, e.to_string())),
            Err(_) => Err((
                summary::TRANSCRIPTION_FAILED,
                format!("transcription timed out after {}s", self.config.ai_timeout.as_secs()),
            )),
        };
        let transcript = match transcript {
            Ok(text) => text,
            Err((placeholder, reason)) => {
                return Description {
                    text: placeholder.to_string(),
                    audio,
                    transcription: Some(StageOutcome::degraded(reason)),
                    summary: None,
                };
            }
        };

        let (text, summary_outcome) = match tokio::time::timeout(
            self.config.ai_timeout,
            self.summarizer.summarize(&transcript),
        )
        .await
        {
            Ok(Ok(text)) => (text, StageOutcome::Done(())),
            Ok(Err(AiError::NotConfigured)) => (
                summary::SUMMARY_UNAVAILABLE.to_string(),
                StageOutcome::degraded(AiError::NotConfigured.to_string()),
            ),
            Ok(Err(e)) => (
                summary::SUMMARY_FAILED.to_string(),
                StageOutcome::degraded(e.to_string()),
            ),
            Err(_) => (
                summary::SUMMARY_FAILED.to_string(),
                StageOutcome::degraded(format!(
                    "summary timed out after {}s",
                    self.config.ai_timeout.as_secs()
                )),
            ),
        };

        Description {
            text,
            audio,
            transcription: Some(StageOutcome::Done(())),
            summary: Some(summary_outcome),
        }
    }

    async fn discard_blobs(&self, logger: &PipelineLogger, urls: &[String]) {
        for url in urls {
            if let Err(e) = self.storage.delete(url).await {
                logger.log_warning(&format!("could not delete orphaned blob {url}: {e}"));
            }
        }
    }
}

fn validate(request: &UploadRequest) -> PipelineResult<()> {
    if request.data.is_empty() {
        return Err(PipelineError::validation("video file is empty"));
    }
    let probe = NewVideo {
        owner_id: request.owner_id.clone(),
        title: request.title.trim().to_string(),
        description: String::new(),
        video_url: String::new(),
        thumbnail_url: String::new(),
        preview_url: String::new(),
        duration: String::new(),
        privacy: request.privacy,
        ai_summary: String::new(),
    };
    probe.validate().map_err(|e| {
        warn!(error = %e, "Rejected upload");
        PipelineError::validation(format!("title must be 1 to 255 characters ({e})"))
    })
}
