//! OpenAI-compatible HTTP client.
//!
//! Works with any provider exposing `/audio/transcriptions` and
//! `/chat/completions` (OpenAI, Groq, OpenRouter, local servers).

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::AiConfig;
use crate::error::{AiError, AiResult};
use crate::{SpeechToText, Summarizer};

const SUMMARY_PROMPT: &str = "You are a helpful video assistant. Summarize the following video \
transcript in 2-3 sentences. Keep it exciting.";

/// Transcription response (`response_format=json`).
#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Client for an OpenAI-compatible API.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    api_key: String,
    base_url: String,
    transcribe_model: String,
    summary_model: String,
    client: Client,
}

impl OpenAiClient {
    /// Build a client. Fails when the config has no API key.
    pub fn new(config: &AiConfig) -> AiResult<Self> {
        let api_key = config.api_key.clone().ok_or(AiError::NotConfigured)?;
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            transcribe_model: config.transcribe_model.clone(),
            summary_model: config.summary_model.clone(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(response: Response, api: &str) -> AiResult<Response> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            debug!("{} API returned {}: {}", api, status, body);
            return Err(AiError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl SpeechToText for OpenAiClient {
    async fn transcribe(&self, audio_path: &Path) -> AiResult<Option<String>> {
        let bytes = tokio::fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio.mp3".to_string());
        debug!("Transcribing {} ({} bytes)", file_name, bytes.len());

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("audio/mpeg")?;
        let form = Form::new()
            .part("file", part)
            .text("model", self.transcribe_model.clone())
            .text("response_format", "json");

        let response = self
            .client
            .post(self.url("/audio/transcriptions"))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;
        let response = Self::check(response, "Transcription").await?;

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| AiError::invalid_response(e.to_string()))?;

        let text = parsed.text.trim();
        info!(chars = text.len(), "Transcription finished");
        Ok((!text.is_empty()).then(|| text.to_string()))
    }
}

#[async_trait]
impl Summarizer for OpenAiClient {
    async fn summarize(&self, transcript: &str) -> AiResult<String> {
        let request = ChatRequest {
            model: &self.summary_model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SUMMARY_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: transcript,
                },
            ],
        };

        let response = self
            .client
            .post(self.url("/chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        let response = Self::check(response, "Chat").await?;

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AiError::invalid_response(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AiError::invalid_response("No content in chat response"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_api_key() {
        let err = OpenAiClient::new(&AiConfig::default()).unwrap_err();
        assert!(matches!(err, AiError::NotConfigured));
    }

    #[test]
    fn test_url_join() {
        let config = AiConfig {
            api_key: Some("k".into()),
            base_url: "http://localhost:9/v1/".into(),
            ..Default::default()
        };
        let client = OpenAiClient::new(&config).unwrap();
        assert_eq!(client.url("/chat/completions"), "http://localhost:9/v1/chat/completions");
    }
}
