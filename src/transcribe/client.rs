//! Core `Transcriber` trait and `GeminiClient` implementation.
//!
//! `GeminiClient` posts one audio payload per call to the Generative
//! Language `generateContent` endpoint: the WAV bytes go inline as base64
//! with an `audio/wav` MIME type, and the transcript comes back as the first
//! candidate's first text part.  All connection details come from
//! [`GeminiConfig`]; nothing is hardcoded.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use thiserror::Error;

use crate::config::GeminiConfig;

// ---------------------------------------------------------------------------
// TranscribeError
// ---------------------------------------------------------------------------

/// Errors from a single transcription call.
///
/// Every variant is non-fatal to the caller: the worker pool recovers at the
/// unit level via the fallback model, and nothing here ever crashes the
/// process.
#[derive(Debug, Error)]
pub enum TranscribeError {
    /// No API key in config or the `GEMINI_API_KEY` environment variable.
    #[error("no API key configured (set GEMINI_API_KEY)")]
    MissingApiKey,

    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The call did not complete within its timeout budget.
    #[error("transcription request timed out")]
    Timeout,

    /// The service answered with a non-success HTTP status.
    #[error("transcription service returned HTTP {0}")]
    HttpStatus(u16),

    /// The response body was not JSON, or the expected
    /// `candidates[0].content.parts[0].text` path was absent.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for TranscribeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TranscribeError::Timeout
        } else {
            TranscribeError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Transcriber trait
// ---------------------------------------------------------------------------

/// Async interface for one-payload transcription backends.
///
/// Implementors must be `Send + Sync` so they can be shared across worker
/// tasks behind an `Arc<dyn Transcriber>`.
///
/// # Contract
///
/// * `wav` is a complete, self-contained audio container (a segment wrapped
///   as a standalone file, or the whole buffer).
/// * Success yields the trimmed transcript — **possibly empty**.  A silent
///   segment is not an error; aggregation discards empty text later.
/// * `timeout` bounds the whole call; exceeding it is a failure.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(
        &self,
        wav: &[u8],
        model: &str,
        timeout: Duration,
    ) -> Result<String, TranscribeError>;
}

// ---------------------------------------------------------------------------
// GeminiClient
// ---------------------------------------------------------------------------

/// Production transcriber backed by the Gemini REST API.
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
    api_key: Option<String>,
}

impl GeminiClient {
    /// Build a client from application config.
    ///
    /// The API key is resolved once here (environment variable wins over the
    /// settings file).  Timeouts are applied per request, not on the client,
    /// because single-shot and per-segment calls use different budgets.
    pub fn from_config(config: &GeminiConfig) -> Self {
        let client = reqwest::Client::new();
        let api_key = config.resolve_api_key();

        Self {
            client,
            config: config.clone(),
            api_key,
        }
    }
}

/// Build the `generateContent` request body for one audio payload.
pub(crate) fn build_request(config: &GeminiConfig, wav: &[u8]) -> serde_json::Value {
    serde_json::json!({
        "contents": [{
            "parts": [
                { "text": config.prompt },
                { "inlineData": { "mimeType": "audio/wav", "data": BASE64.encode(wav) } }
            ]
        }],
        "generationConfig": {
            "temperature": config.temperature,
            "maxOutputTokens": config.max_output_tokens
        }
    })
}

/// Extract the transcript from a `generateContent` response body.
///
/// The text lives at `candidates[0].content.parts[0].text`; absence of that
/// path is a parse failure, not a crash.
pub(crate) fn extract_text(response: &serde_json::Value) -> Result<String, TranscribeError> {
    response
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .ok_or_else(|| {
            TranscribeError::MalformedResponse(
                "missing candidates[0].content.parts[0].text".into(),
            )
        })
}

#[async_trait]
impl Transcriber for GeminiClient {
    async fn transcribe(
        &self,
        wav: &[u8],
        model: &str,
        timeout: Duration,
    ) -> Result<String, TranscribeError> {
        let key = self.api_key.as_deref().ok_or(TranscribeError::MissingApiKey)?;

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.config.base_url, model, key
        );

        let body = build_request(&self.config, wav);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranscribeError::HttpStatus(status.as_u16()));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TranscribeError::MalformedResponse(e.to_string()))?;

        extract_text(&json)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_response(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [{ "text": text }],
                    "role": "model"
                },
                "finishReason": "STOP"
            }]
        })
    }

    /// The happy path pulls the first candidate's first text part, trimmed.
    #[test]
    fn extract_text_happy_path() {
        let response = sample_response("  hello world \n");
        assert_eq!(extract_text(&response).unwrap(), "hello world");
    }

    /// Whitespace-only responses become empty text — a success, since silent
    /// segments are discarded at aggregation, not here.
    #[test]
    fn extract_text_allows_empty() {
        let response = sample_response("   ");
        assert_eq!(extract_text(&response).unwrap(), "");
    }

    /// A response without the candidates path is a malformed response.
    #[test]
    fn extract_text_missing_path_is_malformed() {
        let response = serde_json::json!({ "promptFeedback": {} });
        assert!(matches!(
            extract_text(&response),
            Err(TranscribeError::MalformedResponse(_))
        ));
    }

    /// Non-string text parts are also malformed.
    #[test]
    fn extract_text_non_string_is_malformed() {
        let response = serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": 42 }] } }]
        });
        assert!(matches!(
            extract_text(&response),
            Err(TranscribeError::MalformedResponse(_))
        ));
    }

    /// The request body carries the prompt, the inline base64 payload with
    /// the WAV MIME type, and the generation settings.
    #[test]
    fn build_request_shape() {
        let config = GeminiConfig::default();
        let body = build_request(&config, b"RIFFxxxx");

        assert_eq!(
            body.pointer("/contents/0/parts/0/text").and_then(|v| v.as_str()),
            Some(config.prompt.as_str())
        );
        assert_eq!(
            body.pointer("/contents/0/parts/1/inlineData/mimeType")
                .and_then(|v| v.as_str()),
            Some("audio/wav")
        );
        let data = body
            .pointer("/contents/0/parts/1/inlineData/data")
            .and_then(|v| v.as_str())
            .unwrap();
        assert_eq!(BASE64.decode(data).unwrap(), b"RIFFxxxx");

        assert_eq!(
            body.pointer("/generationConfig/maxOutputTokens")
                .and_then(|v| v.as_u64()),
            Some(1000)
        );
    }

    /// Without an API key the call fails before any network activity.
    #[tokio::test]
    async fn missing_api_key_short_circuits() {
        let mut config = GeminiConfig::default();
        config.api_key = None;
        let client = GeminiClient {
            client: reqwest::Client::new(),
            config,
            api_key: None,
        };

        let err = client
            .transcribe(b"RIFF", "gemini-1.5-flash", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, TranscribeError::MissingApiKey));
    }

    /// GeminiClient must be usable as a `dyn Transcriber`.
    #[test]
    fn client_is_object_safe() {
        let client: Box<dyn Transcriber> =
            Box::new(GeminiClient::from_config(&GeminiConfig::default()));
        drop(client);
    }
}
