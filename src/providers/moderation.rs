//! Content moderation via Azure AI Content Safety.
//!
//! Text is sent as-is; images are sent as base64 in the JSON body. Only the
//! categories the service scores above zero are returned, in the order the
//! service lists them.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use super::error::{azure_error, AnalysisError, AnalysisResult};
use super::SUBSCRIPTION_KEY_HEADER;
use crate::domain::ModerationFinding;

const CONTENT_SAFETY_API_VERSION: &str = "2023-10-01";

/// Classifies text and images into risk categories.
#[async_trait]
pub trait ModerationProvider: Send + Sync {
    /// Returns the flagged categories for a piece of text.
    async fn analyze_text(&self, text: &str) -> AnalysisResult<Vec<ModerationFinding>>;

    /// Returns the flagged categories for raw image bytes.
    async fn analyze_image(&self, image: &[u8]) -> AnalysisResult<Vec<ModerationFinding>>;
}

#[derive(Debug, Serialize)]
struct AnalyzeTextRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct AnalyzeImageRequest {
    image: ImageData,
}

#[derive(Debug, Serialize)]
struct ImageData {
    content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResponse {
    #[serde(default)]
    categories_analysis: Vec<CategoryAnalysis>,
}

#[derive(Debug, Deserialize)]
struct CategoryAnalysis {
    category: String,
    #[serde(default)]
    severity: Option<u32>,
}

impl AnalyzeResponse {
    fn into_findings(self) -> Vec<ModerationFinding> {
        self.categories_analysis
            .into_iter()
            .filter_map(|analysis| match analysis.severity {
                Some(severity) if severity > 0 => {
                    Some(ModerationFinding::new(analysis.category, severity))
                }
                _ => None,
            })
            .collect()
    }
}

/// Azure AI Content Safety client.
pub struct ContentSafetyProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl ContentSafetyProvider {
    /// Creates a client for the resource at `endpoint`
    /// (e.g. `https://<name>.cognitiveservices.azure.com`).
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Overrides the HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn url(&self, operation: &str) -> String {
        format!(
            "{}/contentsafety/{}?api-version={}",
            self.endpoint, operation, CONTENT_SAFETY_API_VERSION
        )
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        operation: &str,
        body: &B,
    ) -> AnalysisResult<Vec<ModerationFinding>> {
        let response = self
            .client
            .post(self.url(operation))
            .header(SUBSCRIPTION_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(azure_error(response).await);
        }

        let parsed: AnalyzeResponse = response.json().await.map_err(|e| {
            AnalysisError::MalformedResponse(format!("Failed to parse response: {}", e))
        })?;

        Ok(parsed.into_findings())
    }
}

#[async_trait]
impl ModerationProvider for ContentSafetyProvider {
    async fn analyze_text(&self, text: &str) -> AnalysisResult<Vec<ModerationFinding>> {
        tracing::debug!(chars = text.len(), "Analyzing text moderation");
        self.post("text:analyze", &AnalyzeTextRequest { text }).await
    }

    async fn analyze_image(&self, image: &[u8]) -> AnalysisResult<Vec<ModerationFinding>> {
        tracing::debug!(bytes = image.len(), "Analyzing image moderation");
        let request = AnalyzeImageRequest {
            image: ImageData {
                content: STANDARD.encode(image),
            },
        };
        self.post("image:analyze", &request).await
    }
}
