//! Per-stage outcomes and the run report.

use std::fmt;

use serde::Serialize;
use yv_models::UploadId;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Transcode,
    Probe,
    Preview,
    Audio,
    Transcription,
    Summary,
    Thumbnail,
    VideoUpload,
    ThumbnailUpload,
    PreviewUpload,
    Persist,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Transcode => "transcode",
            Stage::Probe => "probe",
            Stage::Preview => "preview",
            Stage::Audio => "audio",
            Stage::Transcription => "transcription",
            Stage::Summary => "summary",
            Stage::Thumbnail => "thumbnail",
            Stage::VideoUpload => "video_upload",
            Stage::ThumbnailUpload => "thumbnail_upload",
            Stage::PreviewUpload => "preview_upload",
            Stage::Persist => "persist",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a non-fatal stage.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome<T> {
    Done(T),
    Degraded { reason: String },
}

impl<T> StageOutcome<T> {
    pub fn degraded(reason: impl Into<String>) -> Self {
        Self::Degraded {
            reason: reason.into(),
        }
    }

    pub fn from_result<E: fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Done(value),
            Err(e) => Self::degraded(e.to_string()),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Done(_) => None,
            Self::Degraded { reason } => Some(reason),
        }
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Self::Done(value) => Some(value),
            Self::Degraded { .. } => None,
        }
    }
}

/// What happened to one stage of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageRecord {
    pub stage: Stage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<String>,
}

/// Stage-by-stage account of one run. Skipped stages are absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    pub upload_id: UploadId,
    pub stages: Vec<StageRecord>,
    pub elapsed_ms: u64,
}

impl PipelineReport {
    pub fn new(upload_id: UploadId) -> Self {
        Self {
            upload_id,
            stages: Vec::new(),
            elapsed_ms: 0,
        }
    }

    pub fn record<T>(&mut self, stage: Stage, outcome: &StageOutcome<T>) {
        self.stages.push(StageRecord {
            stage,
            degraded: outcome.reason().map(str::to_string),
        });
    }

    pub fn outcome_of(&self, stage: Stage) -> Option<&StageRecord> {
        self.stages.iter().find(|r| r.stage == stage)
    }

    pub fn ran(&self, stage: Stage) -> bool {
        self.outcome_of(stage).is_some()
    }

    pub fn degraded(&self) -> impl Iterator<Item = &StageRecord> {
        self.stages.iter().filter(|r| r.degraded.is_some())
    }

    pub fn is_clean(&self) -> bool {
        self.degraded().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_result() {
        let ok: StageOutcome<u8> = StageOutcome::from_result(Ok::<_, String>(3));
        assert_eq!(ok.clone().ok(), Some(3));
        assert!(ok.reason().is_none());

        let bad: StageOutcome<u8> = StageOutcome::from_result(Err("boom"));
        assert_eq!(bad.reason(), Some("boom"));
        assert!(!bad.is_done());
    }

    #[test]
    fn test_report_tracks_degraded_stages() {
        let mut report = PipelineReport::new(UploadId::new());
        report.record(Stage::Transcode, &StageOutcome::Done(()));
        assert!(report.is_clean());

        report.record::<()>(Stage::Preview, &StageOutcome::degraded("ffmpeg exited 1"));
        assert!(!report.is_clean());
        assert!(report.ran(Stage::Preview));
        assert!(!report.ran(Stage::Summary));
        assert_eq!(
            report.outcome_of(Stage::Preview).unwrap().degraded.as_deref(),
            Some("ffmpeg exited 1")
        );
    }
}
