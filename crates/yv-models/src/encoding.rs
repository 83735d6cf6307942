//! Media encoding settings used by the ingestion pipeline.

/// Web playback codec (H.264)
pub const VIDEO_CODEC: &str = "libx264";
/// Web playback audio codec
pub const AUDIO_CODEC: &str = "aac";
/// Transcode preset
pub const TRANSCODE_PRESET: &str = "fast";
/// Constant Rate Factor for the playback file
pub const TRANSCODE_CRF: u8 = 23;
/// Playback audio bitrate
pub const TRANSCODE_AUDIO_BITRATE: &str = "128k";

/// Thumbnail generation settings
pub const THUMBNAIL_SCALE_WIDTH: u32 = 480;
pub const THUMBNAIL_TIMESTAMP: &str = "00:00:01";

/// Hover preview settings (silent animated GIF)
pub const PREVIEW_OFFSET_SECS: f64 = 2.0;
pub const PREVIEW_DURATION_SECS: f64 = 3.0;
pub const PREVIEW_WIDTH: u32 = 320;
pub const PREVIEW_FPS: u32 = 10;

/// Speech-to-text audio settings. Low quality keeps uploads to the
/// transcription service small.
pub const SPEECH_SAMPLE_RATE: u32 = 16_000;
pub const SPEECH_CHANNELS: u32 = 1;
pub const SPEECH_BITRATE: &str = "32k";

/// Duration string used when probing fails.
pub const UNKNOWN_DURATION: &str = "00:00:00";
