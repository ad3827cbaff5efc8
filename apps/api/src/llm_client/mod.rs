//! LLM Client: the single point of entry for all Gemini API calls in MindCanvas.
//!
//! ARCHITECTURAL RULE: No other module may call the Gemini API directly.
//! All model interactions MUST go through the `ModelClient` trait defined here.
//!
//! Model: gemini-flash-latest (hardcoded, not configurable)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;
pub mod types;

use types::{GenerateContentRequest, GenerateContentResponse};
pub use types::{Candidate, ContentPart, FinishReason, GenerationParams, ModelResult};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// The model used for all generation calls in MindCanvas.
pub const MODEL: &str = "gemini-flash-latest";
/// Value shipped in `.env.example`; treated the same as an unset key.
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Model API key is missing or still set to the placeholder")]
    ConfigurationMissing,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model call timed out")]
    Timeout,

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl LlmError {
    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Http(err)
        }
    }
}

/// Narrow seam between the generation pipeline and the model provider.
///
/// Carried by the visualizer as `Arc<dyn ModelClient>` so tests can script responses.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Whether a usable credential is present. When false, `invoke` fails
    /// with `ConfigurationMissing` without touching the network.
    fn is_configured(&self) -> bool;

    /// Sends one prompt to the provider. Exactly one network call per invocation.
    async fn invoke(&self, prompt: &str, params: &GenerationParams)
        -> Result<ModelResult, LlmError>;
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// Returns the key only when it is non-empty and not the placeholder.
pub fn usable_api_key(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim)
        .filter(|key| !key.is_empty() && *key != PLACEHOLDER_API_KEY)
}

/// The Gemini `generateContent` client used by the visualizer.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiClient {
    /// Builds the client. `timeout` bounds every call; a timeout surfaces as `LlmError::Timeout`.
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: usable_api_key(api_key.as_deref()).map(str::to_string),
            base_url: GEMINI_API_BASE.to_string(),
        })
    }

    /// Points the client at another `models` endpoint root (a local mock in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn invoke(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ModelResult, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(LlmError::ConfigurationMissing)?;

        let request_body = GenerateContentRequest::new(prompt, params);
        let url = format!("{}/{MODEL}:generateContent", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(LlmError::from_transport)?;

        let status = response.status();
        let body = response.text().await.map_err(LlmError::from_transport)?;

        if !status.is_success() {
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!("Gemini API returned {}: {}", status, message);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let raw: GenerateContentResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &raw.usage_metadata {
            debug!(
                "Gemini call succeeded: prompt_tokens={}, candidate_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        Ok(raw.into_model_result())
    }
}
