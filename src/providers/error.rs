//! Error type shared by the analysis adapters.

use thiserror::Error;

use super::llm::LlmError;

/// Errors that can occur while calling an analysis service.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response format: {0}")]
    MalformedResponse(String),

    /// The service accepted the request but rejected the document.
    #[error("{0}")]
    Document(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

impl From<LlmError> for AnalysisError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::HttpError(e) => AnalysisError::Transport(e),
            LlmError::AuthenticationError(message) => AnalysisError::Authentication(message),
            LlmError::ApiError { status, message } => AnalysisError::Api { status, message },
            LlmError::RateLimited { retry_after_secs } => AnalysisError::Api {
                status: 429,
                message: match retry_after_secs {
                    Some(secs) => format!("rate limited, retry after {} seconds", secs),
                    None => "rate limited".to_string(),
                },
            },
            LlmError::InvalidResponse(message) => AnalysisError::MalformedResponse(message),
        }
    }
}

/// Azure Cognitive Services error envelope, shared by Content Safety and Language.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct AzureErrorEnvelope {
    pub error: AzureErrorDetail,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct AzureErrorDetail {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
}

/// Maps a non-success Azure response to an [`AnalysisError`].
pub(crate) async fn azure_error(response: reqwest::Response) -> AnalysisError {
    let status = response.status().as_u16();

    match response.json::<AzureErrorEnvelope>().await {
        Ok(envelope) => {
            if status == 401 || status == 403 {
                return AnalysisError::Authentication(envelope.error.message);
            }
            let message = match envelope.error.code {
                Some(code) => format!("{}: {}", code, envelope.error.message),
                None => envelope.error.message,
            };
            AnalysisError::Api { status, message }
        }
        Err(_) if status == 401 || status == 403 => {
            AnalysisError::Authentication(format!("HTTP {}", status))
        }
        Err(_) => AnalysisError::Api {
            status,
            message: format!("HTTP {}", status),
        },
    }
}
