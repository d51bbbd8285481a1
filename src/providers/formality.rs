//! Formality judgment from a chat model.

use std::sync::Arc;

use async_trait::async_trait;

use super::error::AnalysisResult;
use super::llm::{CompletionRequest, FinishReason, LlmProvider, Message};
use crate::domain::FormalityVerdict;

/// Judges whether text reads as formal or informal.
#[async_trait]
pub trait FormalityProvider: Send + Sync {
    async fn analyze_formality(&self, text: &str) -> AnalysisResult<FormalityVerdict>;
}

/// Builds the fixed prompt sent to the model.
pub fn formality_prompt(text: &str) -> String {
    format!(
        "Determine if the following text is formal or informal:\n\n'{}'",
        text
    )
}

/// Asks an [`LlmProvider`] for a formality judgment.
///
/// The model's answer is returned verbatim.
pub struct LlmFormalityProvider {
    llm: Arc<dyn LlmProvider>,
}

impl LlmFormalityProvider {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl FormalityProvider for LlmFormalityProvider {
    async fn analyze_formality(&self, text: &str) -> AnalysisResult<FormalityVerdict> {
        tracing::debug!(provider = self.llm.name(), model = self.llm.model(), "Analyzing formality");

        let request = CompletionRequest::new(vec![Message::user(formality_prompt(text))]);
        let response = self.llm.complete(&request).await?;

        tracing::debug!(
            input_tokens = response.tokens_used.input_tokens,
            output_tokens = response.tokens_used.output_tokens,
            finish_reason = ?response.finish_reason,
            "Formality judgment received"
        );
        if response.finish_reason == FinishReason::Length {
            tracing::warn!(model = self.llm.model(), "Formality judgment was truncated");
        }

        Ok(FormalityVerdict::new(response.text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::llm::{CompletionResponse, LlmError, LlmResult, Role, TokenUsage};
    use crate::providers::AnalysisError;
    use std::sync::Mutex;

    struct RecordingLlm {
        reply: Option<String>,
        finish_reason: FinishReason,
        prompts: Mutex<Vec<Message>>,
    }

    impl RecordingLlm {
        fn replying(text: &str) -> Self {
            Self {
                reply: Some(text.to_string()),
                finish_reason: FinishReason::Stop,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for RecordingLlm {
        fn name(&self) -> &str {
            "recording"
        }

        fn model(&self) -> &str {
            "test-model"
        }

        async fn complete(&self, request: &CompletionRequest) -> LlmResult<CompletionResponse> {
            self.prompts
                .lock()
                .unwrap()
                .extend(request.messages.iter().cloned());
            match &self.reply {
                Some(text) => Ok(CompletionResponse {
                    text: text.clone(),
                    tokens_used: TokenUsage {
                        input_tokens: 24,
                        output_tokens: 9,
                    },
                    finish_reason: self.finish_reason,
                }),
                None => Err(LlmError::AuthenticationError("invalid api token".to_string())),
            }
        }
    }

    #[test]
    fn test_prompt_template() {
        assert_eq!(
            formality_prompt("hey whats up"),
            "Determine if the following text is formal or informal:\n\n'hey whats up'"
        );
    }

    #[tokio::test]
    async fn test_returns_raw_judgment() {
        let llm = Arc::new(RecordingLlm::replying("The text is informal. It uses slang."));
        let provider = LlmFormalityProvider::new(llm.clone());

        let verdict = provider.analyze_formality("hey whats up").await.unwrap();
        assert_eq!(verdict.raw_text, "The text is informal. It uses slang.");

        let prompts = llm.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].role, Role::User);
        assert!(prompts[0].content.ends_with("'hey whats up'"));
    }

    #[tokio::test]
    async fn test_llm_failure_is_typed() {
        let provider = LlmFormalityProvider::new(Arc::new(RecordingLlm {
            reply: None,
            finish_reason: FinishReason::Stop,
            prompts: Mutex::new(Vec::new()),
        }));

        let err = provider.analyze_formality("Dear Sir").await.unwrap_err();
        assert!(matches!(err, AnalysisError::Authentication(_)));
    }

    #[tokio::test]
    async fn test_truncated_judgment_is_kept() {
        let provider = LlmFormalityProvider::new(Arc::new(RecordingLlm {
            finish_reason: FinishReason::Length,
            ..RecordingLlm::replying("The text is mostly formal, although")
        }));

        let verdict = provider.analyze_formality("Dear team").await.unwrap();
        assert_eq!(verdict.raw_text, "The text is mostly formal, although");
    }
}
