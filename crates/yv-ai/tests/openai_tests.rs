//! OpenAI-compatible client against a mock server.

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use yv_ai::{AiConfig, AiError, OpenAiClient, SpeechToText, Summarizer};

fn client_for(server: &MockServer) -> OpenAiClient {
    let config = AiConfig {
        api_key: Some("test-key".to_string()),
        base_url: format!("{}/v1", server.uri()),
        ..Default::default()
    };
    OpenAiClient::new(&config).unwrap()
}

async fn audio_file() -> tempfile::TempPath {
    let file = tempfile::Builder::new().suffix(".mp3").tempfile().unwrap();
    let path = file.into_temp_path();
    tokio::fs::write(&path, b"ID3 fake mp3").await.unwrap();
    path
}

#[tokio::test]
async fn test_transcribe_returns_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/audio/transcriptions"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "text": "  Hello and welcome to the channel.  "
        })))
        .expect(1)
        .mount(&server)
        .await;

    let audio = audio_file().await;
    let text = client_for(&server).transcribe(&audio).await.unwrap();
    assert_eq!(text.as_deref(), Some("Hello and welcome to the channel."));
}

#[tokio::test]
async fn test_transcribe_blank_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "text": " " })))
        .mount(&server)
        .await;

    let audio = audio_file().await;
    assert_eq!(client_for(&server).transcribe(&audio).await.unwrap(), None);
}

#[tokio::test]
async fn test_transcribe_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let audio = audio_file().await;
    let err = client_for(&server).transcribe(&audio).await.unwrap_err();
    match err {
        AiError::Api { status, body } => {
            assert_eq!(status, 429);
            assert_eq!(body, "rate limited");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_summarize_returns_first_choice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [
                { "message": { "role": "assistant", "content": "A cat learns piano. Chaos follows." } }
            ]
        })))
        .mount(&server)
        .await;

    let summary = client_for(&server)
        .summarize("the cat sat on the keys")
        .await
        .unwrap();
    assert_eq!(summary, "A cat learns piano. Chaos follows.");
}

#[tokio::test]
async fn test_summarize_without_choices_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let err = client_for(&server).summarize("x").await.unwrap_err();
    assert!(matches!(err, AiError::InvalidResponse(_)));
}
