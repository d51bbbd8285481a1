//! Sentiment analysis via the Azure AI Language `analyze-text` endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::{azure_error, AnalysisError, AnalysisResult};
use super::SUBSCRIPTION_KEY_HEADER;
use crate::domain::{ConfidenceScores, SentenceSentiment, SentimentLabel, SentimentReport};

const LANGUAGE_API_VERSION: &str = "2023-04-01";
const DOCUMENT_ID: &str = "1";

/// Scores the sentiment of a document and its sentences.
#[async_trait]
pub trait SentimentProvider: Send + Sync {
    async fn analyze_sentiment(&self, text: &str) -> AnalysisResult<SentimentReport>;
}

#[derive(Debug, Serialize)]
struct AnalyzeTextRequest<'a> {
    kind: &'static str,
    parameters: SentimentParameters,
    #[serde(rename = "analysisInput")]
    analysis_input: AnalysisInput<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SentimentParameters {
    opinion_mining: bool,
}

#[derive(Debug, Serialize)]
struct AnalysisInput<'a> {
    documents: Vec<InputDocument<'a>>,
}

#[derive(Debug, Serialize)]
struct InputDocument<'a> {
    id: &'static str,
    language: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnalyzeTextResponse {
    results: SentimentResults,
}

#[derive(Debug, Deserialize)]
struct SentimentResults {
    #[serde(default)]
    documents: Vec<DocumentSentiment>,
    #[serde(default)]
    errors: Vec<DocumentError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentSentiment {
    id: String,
    sentiment: SentimentLabel,
    confidence_scores: ConfidenceScores,
    #[serde(default)]
    sentences: Vec<SentenceResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SentenceResult {
    text: String,
    sentiment: SentimentLabel,
    confidence_scores: ConfidenceScores,
}

#[derive(Debug, Deserialize)]
struct DocumentError {
    id: String,
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

impl SentimentResults {
    fn into_report(self) -> AnalysisResult<SentimentReport> {
        if let Some(failed) = self.errors.into_iter().find(|e| e.id == DOCUMENT_ID) {
            let message = match failed.error.code {
                Some(code) => format!("{}: {}", code, failed.error.message),
                None => failed.error.message,
            };
            return Err(AnalysisError::Document(message));
        }

        let document = self
            .documents
            .into_iter()
            .find(|d| d.id == DOCUMENT_ID)
            .ok_or_else(|| {
                AnalysisError::MalformedResponse("No document in sentiment results".to_string())
            })?;

        Ok(SentimentReport {
            overall_label: document.sentiment,
            scores: document.confidence_scores,
            sentences: document
                .sentences
                .into_iter()
                .map(|s| SentenceSentiment {
                    text: s.text,
                    label: s.sentiment,
                    scores: s.confidence_scores,
                })
                .collect(),
        })
    }
}

/// Azure AI Language sentiment client.
pub struct TextAnalyticsProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    language: String,
}

impl TextAnalyticsProvider {
    /// Creates a client for English text at the given resource endpoint.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            language: "en".to_string(),
        }
    }

    /// Sets the ISO 639-1 language hint sent with each document.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Overrides the HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn url(&self) -> String {
        format!(
            "{}/language/:analyze-text?api-version={}",
            self.endpoint, LANGUAGE_API_VERSION
        )
    }

    fn build_request<'a>(&'a self, text: &'a str) -> AnalyzeTextRequest<'a> {
        AnalyzeTextRequest {
            kind: "SentimentAnalysis",
            parameters: SentimentParameters {
                opinion_mining: true,
            },
            analysis_input: AnalysisInput {
                documents: vec![InputDocument {
                    id: DOCUMENT_ID,
                    language: &self.language,
                    text,
                }],
            },
        }
    }
}

#[async_trait]
impl SentimentProvider for TextAnalyticsProvider {
    async fn analyze_sentiment(&self, text: &str) -> AnalysisResult<SentimentReport> {
        tracing::debug!(chars = text.len(), "Analyzing sentiment");

        let response = self
            .client
            .post(self.url())
            .header(SUBSCRIPTION_KEY_HEADER, &self.api_key)
            .json(&self.build_request(text))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(azure_error(response).await);
        }

        let parsed: AnalyzeTextResponse = response.json().await.map_err(|e| {
            AnalysisError::MalformedResponse(format!("Failed to parse response: {}", e))
        })?;

        parsed.results.into_report()
    }
}
