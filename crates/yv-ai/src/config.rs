//! AI provider configuration.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AiConfig {
    /// Unset disables transcription and summaries
    pub api_key: Option<String>,
    /// OpenAI-compatible API root, e.g. `https://api.openai.com/v1`
    pub base_url: String,
    pub transcribe_model: String,
    pub summary_model: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            transcribe_model: "whisper-1".to_string(),
            summary_model: "gpt-4o-mini".to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

impl AiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: std::env::var("AI_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            base_url: std::env::var("AI_BASE_URL").unwrap_or(defaults.base_url),
            transcribe_model: std::env::var("AI_TRANSCRIBE_MODEL")
                .unwrap_or(defaults.transcribe_model),
            summary_model: std::env::var("AI_SUMMARY_MODEL").unwrap_or(defaults.summary_model),
            timeout: std::env::var("AI_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}
