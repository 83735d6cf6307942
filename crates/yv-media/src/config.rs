//! Media tool timeouts.

use std::time::Duration;

/// Per-operation limits for external FFmpeg/FFprobe processes.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Full transcode of the upload
    pub transcode_timeout: Duration,
    /// FFprobe metadata read
    pub probe_timeout: Duration,
    /// Preview, audio extraction and thumbnail
    pub derive_timeout: Duration,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            transcode_timeout: Duration::from_secs(1800), // 30 minutes
            probe_timeout: Duration::from_secs(30),
            derive_timeout: Duration::from_secs(120),
        }
    }
}

impl MediaConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            transcode_timeout: env_secs("MEDIA_TRANSCODE_TIMEOUT_SECS")
                .unwrap_or(defaults.transcode_timeout),
            probe_timeout: env_secs("MEDIA_PROBE_TIMEOUT_SECS").unwrap_or(defaults.probe_timeout),
            derive_timeout: env_secs("MEDIA_DERIVE_TIMEOUT_SECS")
                .unwrap_or(defaults.derive_timeout),
        }
    }
}

fn env_secs(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|secs: &u64| *secs > 0)
        .map(Duration::from_secs)
}
