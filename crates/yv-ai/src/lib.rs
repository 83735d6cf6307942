//! AI clients used to describe uploaded videos.
//!
//! - [`SpeechToText`] turns an audio file into a transcript
//! - [`Summarizer`] condenses a transcript into a short description
//!
//! [`OpenAiClient`] implements both against any OpenAI-compatible API.
//! [`UnconfiguredAi`] stands in when no API key is set.

pub mod config;
pub mod error;
pub mod openai;

use async_trait::async_trait;
use std::path::Path;

pub use config::AiConfig;
pub use error::{AiError, AiResult};
pub use openai::OpenAiClient;

#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe an audio file. `None` when no speech was recognised.
    async fn transcribe(&self, audio_path: &Path) -> AiResult<Option<String>>;
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize a transcript in two or three sentences.
    async fn summarize(&self, transcript: &str) -> AiResult<String>;
}

/// Fallback when no AI provider is configured. Every call fails with
/// [`AiError::NotConfigured`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredAi;

#[async_trait]
impl SpeechToText for UnconfiguredAi {
    async fn transcribe(&self, _audio_path: &Path) -> AiResult<Option<String>> {
        Err(AiError::NotConfigured)
    }
}

#[async_trait]
impl Summarizer for UnconfiguredAi {
    async fn summarize(&self, _transcript: &str) -> AiResult<String> {
        Err(AiError::NotConfigured)
    }
}
