//! Cohere v2 chat API provider.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use super::traits::{
    CompletionRequest, CompletionResponse, FinishReason, LlmError, LlmProvider, LlmResult,
    Message, TokenUsage,
};

/// Default base URL for the Cohere API.
const COHERE_BASE_URL: &str = "https://api.cohere.com/v2";

/// Model used when none is configured.
pub const DEFAULT_COHERE_MODEL: &str = "command-r-plus-08-2024";

/// Cohere chat request format.
#[derive(Debug, Serialize)]
struct CohereRequest {
    model: String,
    messages: Vec<CohereMessage>,
}

#[derive(Debug, Serialize)]
struct CohereMessage {
    role: &'static str,
    content: String,
}

impl From<&Message> for CohereMessage {
    fn from(msg: &Message) -> Self {
        Self {
            role: msg.role.as_str(),
            content: msg.content.clone(),
        }
    }
}

/// Cohere chat response format.
#[derive(Debug, Deserialize)]
struct CohereResponse {
    message: CohereResponseMessage,
    finish_reason: Option<String>,
    usage: Option<CohereUsage>,
}

#[derive(Debug, Deserialize)]
struct CohereResponseMessage {
    #[serde(default)]
    content: Vec<CohereContent>,
}

#[derive(Debug, Deserialize)]
struct CohereContent {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CohereUsage {
    tokens: Option<CohereTokens>,
}

#[derive(Debug, Deserialize)]
struct CohereTokens {
    #[serde(default)]
    input_tokens: f64,
    #[serde(default)]
    output_tokens: f64,
}

/// Cohere API error response.
#[derive(Debug, Deserialize)]
struct CohereError {
    message: String,
}

/// Provider for Cohere's chat endpoint.
pub struct CohereProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl CohereProvider {
    /// Creates a provider for the given API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: COHERE_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Creates a provider using [`DEFAULT_COHERE_MODEL`].
    pub fn command_r_plus(api_key: impl Into<String>) -> Self {
        Self::new(api_key, DEFAULT_COHERE_MODEL)
    }

    /// Overrides the base URL (for proxies or test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Overrides the HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", self.api_key)) {
            headers.insert(AUTHORIZATION, value);
        }

        headers
    }

    fn build_request(&self, request: &CompletionRequest) -> CohereRequest {
        CohereRequest {
            model: self.model.clone(),
            messages: request.messages.iter().map(CohereMessage::from).collect(),
        }
    }

    fn parse_finish_reason(reason: Option<&str>) -> FinishReason {
        match reason {
            Some("COMPLETE") | Some("STOP_SEQUENCE") => FinishReason::Stop,
            Some("MAX_TOKENS") => FinishReason::Length,
            _ => FinishReason::Other,
        }
    }

    fn into_completion(response: CohereResponse) -> LlmResult<CompletionResponse> {
        let text = response
            .message
            .content
            .into_iter()
            .filter(|c| c.content_type == "text")
            .find_map(|c| c.text)
            .ok_or_else(|| LlmError::InvalidResponse("No text content in response".to_string()))?;

        let tokens_used = response
            .usage
            .and_then(|u| u.tokens)
            .map(|t| TokenUsage {
                input_tokens: t.input_tokens as usize,
                output_tokens: t.output_tokens as usize,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            text,
            tokens_used,
            finish_reason: Self::parse_finish_reason(response.finish_reason.as_deref()),
        })
    }

    async fn handle_error_response(&self, response: reqwest::Response) -> LlmError {
        let status = response.status().as_u16();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());

            return LlmError::RateLimited {
                retry_after_secs: retry_after,
            };
        }

        match response.json::<CohereError>().await {
            Ok(error) if status == 401 => LlmError::AuthenticationError(error.message),
            Ok(error) => LlmError::ApiError {
                status,
                message: error.message,
            },
            Err(_) => LlmError::ApiError {
                status,
                message: format!("HTTP {}", status),
            },
        }
    }
}

#[async_trait]
impl LlmProvider for CohereProvider {
    fn name(&self) -> &str {
        "cohere"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> LlmResult<CompletionResponse> {
        let url = format!("{}/chat", self.base_url);
        let body = self.build_request(request);

        tracing::debug!(model = %self.model, "Sending Cohere chat request");

        let response = self
            .client
            .post(&url)
            .headers(self.build_headers())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.handle_error_response(response).await);
        }

        let api_response: CohereResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        Self::into_completion(api_response)
    }
}
