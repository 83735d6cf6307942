//! Media ingestion pipeline.
//!
//! Turns one uploaded file into a stored, playable video:
//! - transcode to web MP4 (fatal on failure)
//! - duration probe, animated preview, thumbnail and AI summary, each
//!   degrading to a placeholder on failure
//! - upload of every artifact and the final database row
//!
//! Intermediate files live in a per-upload [`WorkArea`] that is removed on
//! every exit path, including cancellation.

pub mod config;
pub mod error;
pub mod logging;
pub mod outcome;
pub mod pipeline;
pub mod work_area;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use logging::PipelineLogger;
pub use outcome::{PipelineReport, Stage, StageOutcome, StageRecord};
pub use pipeline::{safe_extension, PipelineOutput, ThumbnailUpload, UploadPipeline, UploadRequest};
pub use work_area::WorkArea;
