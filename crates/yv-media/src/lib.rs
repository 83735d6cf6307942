//! FFmpeg CLI wrapper for video ingestion.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - Progress parsing from `-progress pipe:2`
//! - Timeouts that kill the child process
//! - The operations the upload pipeline needs: web transcode, probe,
//!   animated preview, speech audio extraction and thumbnail
//! - [`MediaToolkit`], the seam the pipeline depends on

pub mod audio;
pub mod command;
pub mod config;
pub mod error;
pub mod preview;
pub mod probe;
pub mod progress;
pub mod thumbnail;
pub mod toolkit;
pub mod transcode;

pub use audio::extract_audio;
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use config::MediaConfig;
pub use error::{MediaError, MediaResult};
pub use preview::generate_preview;
pub use probe::{probe_duration, probe_video, VideoInfo};
pub use progress::EncodeProgress;
pub use thumbnail::generate_thumbnail;
pub use toolkit::{FfmpegToolkit, MediaToolkit};
pub use transcode::transcode_for_web;
