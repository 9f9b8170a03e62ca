//! Google Gemini `generateContent` client.
//!
//! Shared by the narrative writer and the article suggestion source. Failures
//! are classified into [`NarrativeError`] variants so a model fallback list can
//! tell "try the next model" apart from "stop".
//!
//! The API key travels in the `x-goog-api-key` header and is never logged.

use leetdigest_core::error::NarrativeError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1";

/// Maximum error-body characters kept in an `ApiError`.
const ERROR_BODY_LIMIT: usize = 1024;

/// Sampling parameters sent with each request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl GenerationConfig {
    /// Settings for the daily study narrative.
    pub const NARRATIVE: Self = Self {
        temperature: 0.3,
        top_p: 0.8,
        max_output_tokens: 2500,
    };

    /// Settings for JSON reading-list suggestions.
    pub const SUGGESTIONS: Self = Self {
        temperature: 0.4,
        top_p: 0.8,
        max_output_tokens: 768,
    };
}

// ── Wire types ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateResponse {
    /// The first non-blank text part across all candidates.
    fn first_text(&self) -> Option<String> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .map(str::trim)
            .find(|t| !t.is_empty())
            .map(str::to_string)
    }

    fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
            .filter(|r| !r.is_empty())
    }

    fn first_finish_reason(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
    }

    /// Turn the response into text, or classify why there is none.
    fn into_text(self, model: &str) -> Result<String, NarrativeError> {
        if let Some(text) = self.first_text() {
            return Ok(text);
        }
        if let Some(reason) = self.block_reason() {
            return Err(NarrativeError::Blocked(reason.to_string()));
        }
        if self.first_finish_reason() == Some("MAX_TOKENS") {
            return Err(NarrativeError::TruncatedBeforeContent(model.to_string()));
        }
        Err(NarrativeError::EmptyResponse {
            model: model.to_string(),
            candidates: self.candidates.len(),
        })
    }
}

// ── Client ─────────────────────────────────────────────────────────────────

/// A thin client over the Gemini REST API.
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: DEFAULT_API_URL.into(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Use a custom base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Call `generateContent` on `model` with a single-part prompt.
    pub async fn generate(
        &self,
        model: &str,
        prompt: &str,
        config: GenerationConfig,
        relax_safety: bool,
    ) -> Result<String, NarrativeError> {
        if !self.is_configured() {
            return Err(NarrativeError::NotConfigured("Gemini API key missing".into()));
        }
        if model.trim().is_empty() {
            return Err(NarrativeError::NotConfigured("Gemini model missing".into()));
        }

        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let safety_settings = if relax_safety {
            HARM_CATEGORIES
                .iter()
                .map(|&category| SafetySetting {
                    category,
                    threshold: "BLOCK_NONE",
                })
                .collect()
        } else {
            Vec::new()
        };
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: config,
            safety_settings,
        };

        debug!(
            provider = "gemini",
            model,
            prompt_chars = prompt.chars().count(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NarrativeError::Timeout(format!("Gemini model {model} timed out"))
                } else {
                    NarrativeError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 404 {
            return Err(NarrativeError::ModelNotFound(model.to_string()));
        }
        if status == 429 {
            return Err(NarrativeError::RateLimited(model.to_string()));
        }
        if !(200..300).contains(&status) {
            let error_body = response.text().await.unwrap_or_default();
            let message: String = error_body.trim().chars().take(ERROR_BODY_LIMIT).collect();
            warn!(status, model, body = %message, "Gemini API error");
            return Err(NarrativeError::ApiError {
                status_code: status,
                message,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| NarrativeError::Decode(format!("Failed to parse Gemini response: {e}")))?;

        debug!(
            model,
            candidates = parsed.candidates.len(),
            finish_reason = parsed.first_finish_reason().unwrap_or(""),
            "Gemini response received"
        );

        parsed.into_text(model)
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> GeminiClient {
        GeminiClient::new("test-key", Duration::from_secs(5)).with_base_url(server.uri())
    }

    async fn respond(server: &MockServer, status: u16, body: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/models/gemini-test:generateContent"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(server)
            .await;
    }

    async fn generate(server: &MockServer) -> Result<String, NarrativeError> {
        client(server)
            .generate("gemini-test", "hello", GenerationConfig::NARRATIVE, true)
            .await
    }

    #[test]
    fn request_serializes_camel_case() {
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: "hi" }],
            }],
            generation_config: GenerationConfig::NARRATIVE,
            safety_settings: Vec::new(),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 2500);
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hi");
        assert!(value.get("safetySettings").is_none());
    }

    #[test]
    fn debug_redacts_key() {
        let client = GeminiClient::new("super-secret", Duration::from_secs(1));
        let debug = format!("{client:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("REDACTED"));
    }

    #[tokio::test]
    async fn returns_first_non_blank_part() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-test:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "generationConfig": {"maxOutputTokens": 2500}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"parts": [{"text": "   "}, {"text": " ## Analysis \n"}]},
                    "finishReason": "STOP"
                }]
            })))
            .mount(&server)
            .await;

        assert_eq!(generate(&server).await.unwrap(), "## Analysis");
    }

    #[tokio::test]
    async fn not_found_and_rate_limit_are_retryable() {
        let server = MockServer::start().await;
        respond(&server, 404, json!({"error": "no such model"})).await;
        let err = generate(&server).await.unwrap_err();
        assert!(matches!(err, NarrativeError::ModelNotFound(ref m) if m == "gemini-test"));
        assert!(err.is_retryable());

        let server = MockServer::start().await;
        respond(&server, 429, json!({})).await;
        let err = generate(&server).await.unwrap_err();
        assert!(matches!(err, NarrativeError::RateLimited(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn server_error_is_terminal() {
        let server = MockServer::start().await;
        respond(&server, 500, json!({"error": "internal"})).await;
        let err = generate(&server).await.unwrap_err();
        assert!(matches!(err, NarrativeError::ApiError { status_code: 500, .. }));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn max_tokens_without_text_is_truncated_before_content() {
        let server = MockServer::start().await;
        respond(
            &server,
            200,
            json!({"candidates": [{"content": {"parts": []}, "finishReason": "MAX_TOKENS"}]}),
        )
        .await;
        let err = generate(&server).await.unwrap_err();
        assert!(matches!(err, NarrativeError::TruncatedBeforeContent(_)));
        assert_eq!(err.reason(), "truncated_before_content");
    }

    #[tokio::test]
    async fn empty_candidates_is_empty_response() {
        let server = MockServer::start().await;
        respond(&server, 200, json!({"candidates": []})).await;
        match generate(&server).await.unwrap_err() {
            NarrativeError::EmptyResponse { model, candidates } => {
                assert_eq!(model, "gemini-test");
                assert_eq!(candidates, 0);
            }
            other => panic!("Expected EmptyResponse, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn block_reason_is_reported() {
        let server = MockServer::start().await;
        respond(&server, 200, json!({"promptFeedback": {"blockReason": "SAFETY"}})).await;
        assert!(matches!(
            generate(&server).await.unwrap_err(),
            NarrativeError::Blocked(ref r) if r == "SAFETY"
        ));
    }

    #[tokio::test]
    async fn missing_key_is_not_configured() {
        let client = GeminiClient::new("", Duration::from_secs(1));
        let err = client
            .generate("m", "p", GenerationConfig::NARRATIVE, false)
            .await
            .unwrap_err();
        assert!(matches!(err, NarrativeError::NotConfigured(_)));
    }
}
