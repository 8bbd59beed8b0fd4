//! Abstractions for generating summaries through a hosted generative-language API.
//!
//! The Gemini-backed client issues `generateContent` requests directly over HTTP and descends
//! the response with fallible lookups rather than a full typed schema, so unknown fields and
//! future additions to the payload are ignored.

use crate::config::Config;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use thiserror::Error;

/// Instruction prepended to the document text.
pub const SUMMARY_PROMPT_PREFIX: &str = "Summarize this: ";
/// Upper bound on generated tokens per summary.
pub const MAX_OUTPUT_TOKENS: u32 = 1000;

/// Errors surfaced while attempting summarization.
#[derive(Debug, Error)]
pub enum SummarizationClientError {
    /// No API key was configured for the provider.
    #[error("Gemini API key is not configured.")]
    MissingApiKey,
    /// Provider was unreachable.
    #[error("Summarization provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate summary: {0}")]
    GenerationFailed(String),
    /// Response body was not valid JSON.
    #[error("Malformed provider response: {0}")]
    Decode(String),
    /// Response body lacked the `candidates` field entirely.
    #[error("Response body is null or missing expected data")]
    MissingCandidates,
    /// `candidates` was present but held no usable summary text.
    #[error("Could not extract text from response")]
    InvalidResponse,
}

/// Interface implemented by summarization providers.
#[async_trait]
pub trait SummarizationClient: Send + Sync {
    /// Produce a summary of `text`.
    async fn summarize(&self, text: &str) -> Result<String, SummarizationClientError>;
}

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    /// Build a client from the loaded configuration.
    pub fn new(config: &Config) -> Result<Self, SummarizationClientError> {
        let http = Client::builder()
            .user_agent("pdfbrief/summary")
            .build()
            .map_err(|error| SummarizationClientError::ProviderUnavailable(error.to_string()))?;
        Ok(Self::with_client(
            http,
            config.gemini_api_url.clone(),
            config.gemini_model.clone(),
            config.gemini_api_key.clone(),
        ))
    }

    /// Build a client around an existing `reqwest::Client`.
    pub fn with_client(
        http: Client,
        base_url: String,
        model: String,
        api_key: Option<String>,
    ) -> Self {
        Self {
            http,
            base_url,
            model,
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

/// Build the `generateContent` request body for `text`.
pub fn build_request_body(text: &str) -> Value {
    json!({
        "contents": [
            { "parts": [ { "text": format!("{SUMMARY_PROMPT_PREFIX}{text}") } ] }
        ],
        "generationConfig": { "maxOutputTokens": MAX_OUTPUT_TOKENS }
    })
}

/// Pull `candidates[0].content.parts[0].text` out of a `generateContent` response.
pub fn extract_summary(body: &Value) -> Result<String, SummarizationClientError> {
    let candidates = body
        .get("candidates")
        .ok_or(SummarizationClientError::MissingCandidates)?;

    candidates
        .as_array()
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)
        .and_then(|parts| parts.first())
        .and_then(|part| part.get("text"))
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .ok_or(SummarizationClientError::InvalidResponse)
}

fn failure_detail(status: StatusCode, body: Result<String, reqwest::Error>) -> String {
    match body {
        Ok(body) => format!("provider returned {status}: {body}"),
        Err(error) => format!(
            "provider returned {status} with unreadable body: {}",
            error.without_url()
        ),
    }
}

#[async_trait]
impl SummarizationClient for GeminiClient {
    async fn summarize(&self, text: &str) -> Result<String, SummarizationClientError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(SummarizationClientError::MissingApiKey)?;

        tracing::debug!(model = %self.model, chars = text.len(), "Requesting summary");
        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&build_request_body(text))
            .send()
            .await
            .map_err(|error| {
                SummarizationClientError::ProviderUnavailable(format!(
                    "failed to reach {}: {}",
                    self.endpoint(),
                    error.without_url()
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await;
            return Err(SummarizationClientError::GenerationFailed(
                failure_detail(status, body),
            ));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|error| SummarizationClientError::Decode(error.without_url().to_string()))?;

        extract_summary(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    fn client(server: &MockServer, api_key: Option<&str>) -> GeminiClient {
        GeminiClient::with_client(
            Client::new(),
            server.url("/v1beta"),
            "gemini-2.0-flash".into(),
            api_key.map(str::to_string),
        )
    }

    #[test]
    fn request_body_prefixes_prompt_and_caps_tokens() {
        let body = build_request_body("Hello world");
        assert_eq!(
            body["contents"][0]["parts"][0]["text"],
            "Summarize this: Hello world"
        );
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1000);
    }

    #[test]
    fn extracts_first_candidate_text() {
        let body = json!({
            "candidates": [
                { "content": { "parts": [ { "text": "A greeting." }, { "text": "ignored" } ] } },
                { "content": { "parts": [ { "text": "second" } ] } }
            ],
            "usageMetadata": { "totalTokenCount": 12 }
        });
        assert_eq!(extract_summary(&body).expect("summary"), "A greeting.");
    }

    #[test]
    fn malformed_shapes_collapse_to_one_error() {
        let shapes = [
            json!({ "candidates": [] }),
            json!({ "candidates": {} }),
            json!({ "candidates": [ {} ] }),
            json!({ "candidates": [ { "content": { "parts": [] } } ] }),
            json!({ "candidates": [ { "content": { "parts": [ { "text": 7 } ] } } ] }),
            json!({ "candidates": [ { "content": { "parts": [ { "text": "" } ] } } ] }),
            json!({ "candidates": [ { "content": { "parts": [ { "text": null } ] } } ] }),
        ];
        for shape in shapes {
            assert!(
                matches!(
                    extract_summary(&shape),
                    Err(SummarizationClientError::InvalidResponse)
                ),
                "shape {shape} should be rejected"
            );
        }
    }

    #[test]
    fn whitespace_summary_is_returned_as_is() {
        let body = json!({
            "candidates": [ { "content": { "parts": [ { "text": "  \n" } ] } } ]
        });
        assert_eq!(extract_summary(&body).expect("summary"), "  \n");
    }

    #[tokio::test]
    async fn unreadable_error_body_is_named_in_failure() {
        let read_error = Client::new()
            .get("http://127.0.0.1:1/unreachable")
            .send()
            .await
            .expect_err("nothing listens on port 1");

        let detail = failure_detail(StatusCode::BAD_GATEWAY, Err(read_error));
        assert!(
            detail.starts_with("provider returned 502 Bad Gateway with unreadable body: "),
            "{detail}"
        );
        assert!(!detail.contains("127.0.0.1"), "{detail}");

        assert_eq!(
            failure_detail(StatusCode::TOO_MANY_REQUESTS, Ok("quota exhausted".into())),
            "provider returned 429 Too Many Requests: quota exhausted"
        );
    }

    #[test]
    fn absent_candidates_is_reported_separately() {
        assert!(matches!(
            extract_summary(&json!({ "promptFeedback": {} })),
            Err(SummarizationClientError::MissingCandidates)
        ));
        assert!(matches!(
            extract_summary(&Value::Null),
            Err(SummarizationClientError::MissingCandidates)
        ));
    }

    #[tokio::test]
    async fn sends_key_as_query_parameter() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1beta/models/gemini-2.0-flash:generateContent")
                    .query_param("key", "gemini-key")
                    .json_body(build_request_body("Hello world"));
                then.status(200).json_body(json!({
                    "candidates": [ { "content": { "parts": [ { "text": "A greeting." } ] } } ]
                }));
            })
            .await;

        let summary = client(&server, Some("gemini-key"))
            .summarize("Hello world")
            .await
            .expect("summary");

        mock.assert_async().await;
        assert_eq!(summary, "A greeting.");
    }

    #[tokio::test]
    async fn missing_key_skips_network_call() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200);
            })
            .await;

        for key in [None, Some(""), Some("   ")] {
            let error = client(&server, key)
                .summarize("text")
                .await
                .expect_err("missing key");
            assert!(matches!(error, SummarizationClientError::MissingApiKey));
        }
        assert_eq!(mock.hits_async().await, 0);
    }

    #[tokio::test]
    async fn error_status_is_generation_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(429).body("quota exhausted");
            })
            .await;

        let error = client(&server, Some("gemini-key"))
            .summarize("text")
            .await
            .expect_err("error response");

        assert!(
            matches!(error, SummarizationClientError::GenerationFailed(ref message) if message.contains("429")),
            "unexpected error: {error:?}"
        );
    }

    #[tokio::test]
    async fn non_json_body_is_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).body("<html>oops</html>");
            })
            .await;

        let error = client(&server, Some("gemini-key"))
            .summarize("text")
            .await
            .expect_err("decode failure");
        assert!(matches!(error, SummarizationClientError::Decode(_)));
    }
}
