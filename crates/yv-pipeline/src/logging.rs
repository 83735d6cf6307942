//! Structured logging for pipeline runs.

use tracing::{error, info, warn, Span};
use yv_models::UploadId;

use crate::outcome::{Stage, StageOutcome};

/// Logs the lifecycle of one upload with its id attached to every event.
#[derive(Debug, Clone)]
pub struct PipelineLogger {
    video_uid: String,
    operation: String,
}

impl PipelineLogger {
    pub fn new(upload_id: &UploadId, operation: &str) -> Self {
        Self {
            video_uid: upload_id.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            video_uid = %self.video_uid,
            operation = %self.operation,
            "Pipeline started: {}", message
        );
    }

    /// Log a stage outcome and count it.
    pub fn log_stage<T>(&self, stage: Stage, outcome: &StageOutcome<T>) {
        let result = match outcome.reason() {
            None => {
                info!(
                    video_uid = %self.video_uid,
                    stage = %stage,
                    "Stage done"
                );
                "done"
            }
            Some(reason) => {
                warn!(
                    video_uid = %self.video_uid,
                    stage = %stage,
                    reason,
                    "Stage degraded"
                );
                "degraded"
            }
        };
        metrics::counter!("yv_pipeline_stage_total", "stage" => stage.as_str(), "outcome" => result)
            .increment(1);
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            video_uid = %self.video_uid,
            operation = %self.operation,
            "Pipeline warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            video_uid = %self.video_uid,
            operation = %self.operation,
            "Pipeline error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            video_uid = %self.video_uid,
            operation = %self.operation,
            "Pipeline completed: {}", message
        );
    }

    pub fn video_uid(&self) -> &str {
        &self.video_uid
    }

    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "pipeline",
            video_uid = %self.video_uid,
            operation = %self.operation
        )
    }
}
