//! HTTP client for the Gemini `generateContent` API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::ExplainError;
use crate::explain::ExplanationGenerator;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/";
pub const DEFAULT_MODEL: &str = "gemini-pro";

/// Gemini text generator.
///
/// Use [`GeminiClient::new`] for production or [`GeminiClient::with_base_url`]
/// to point at a mock server in tests.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    endpoint: Url,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_key", &"[redacted]")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiClient {
    /// Client for the production API using [`DEFAULT_MODEL`].
    ///
    /// # Errors
    ///
    /// Returns [`ExplainError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, ExplainError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL, DEFAULT_MODEL)
    }

    /// Client with a custom base URL and model (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ExplainError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ExplainError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
        model: &str,
    ) -> Result<Self, ExplainError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("parsona/0.1")
            .build()?;

        // Exactly one trailing slash so join() appends rather than replaces.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalised)
            .and_then(|base| base.join(&format!("v1beta/models/{model}:generateContent")))
            .map_err(|e| ExplainError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            endpoint,
        })
    }

    /// Send `prompt` and return the first candidate's text.
    ///
    /// # Errors
    ///
    /// Returns [`ExplainError::Http`] on network failure, non-2xx status, or an
    /// undecodable body, and [`ExplainError::EmptyResponse`] if no candidate
    /// carries text.
    pub async fn generate_content(&self, prompt: &str) -> Result<String, ExplainError> {
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };
        let response: GenerateResponse = self
            .client
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or(ExplainError::EmptyResponse)
    }
}

#[async_trait]
impl ExplanationGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, ExplainError> {
        self.generate_content(prompt).await
    }
}
