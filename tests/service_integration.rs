//! Integration tests for the analysis and mail services.
//!
//! These tests drive the public API with stub providers and verify behavior
//! across module boundaries. Each module contains its own unit tests for
//! detailed logic.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use draftcheck::config::{load_config, save_config, EmailConfig};
use draftcheck::domain::{
    ConfidenceScores, DraftEmail, FormalityVerdict, ModerationFinding, SentenceSentiment,
    SentimentLabel, SentimentReport,
};
use draftcheck::providers::llm::{
    CompletionRequest, CompletionResponse, FinishReason, LlmProvider, LlmResult, TokenUsage,
};
use draftcheck::providers::{
    AnalysisError, AnalysisResult, FormalityProvider, LlmFormalityProvider, ModerationProvider,
    SentimentProvider,
};
use draftcheck::services::{build_message, AnalysisService, OutgoingEmail, SectionKind};

// ============================================================================
// Stub providers
// ============================================================================

#[derive(Default)]
struct FlakyModeration {
    image_calls: AtomicUsize,
}

#[async_trait]
impl ModerationProvider for FlakyModeration {
    async fn analyze_text(&self, _text: &str) -> AnalysisResult<Vec<ModerationFinding>> {
        Err(AnalysisError::MalformedResponse("connection reset".to_string()))
    }

    async fn analyze_image(&self, _image: &[u8]) -> AnalysisResult<Vec<ModerationFinding>> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![
            ModerationFinding::new("Sexual", 2),
            ModerationFinding::new("Violence", 6),
        ])
    }
}

struct SlowSentiment;

#[async_trait]
impl SentimentProvider for SlowSentiment {
    async fn analyze_sentiment(&self, _text: &str) -> AnalysisResult<SentimentReport> {
        // Finishes last so completion order differs from report order.
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(SentimentReport {
            overall_label: SentimentLabel::Positive,
            scores: ConfidenceScores::new(0.9, 0.07, 0.03),
            sentences: vec![SentenceSentiment {
                text: "Thanks for the update.".to_string(),
                label: SentimentLabel::Positive,
                scores: ConfidenceScores::new(0.9, 0.07, 0.03),
            }],
        })
    }
}

struct CannedLlm;

#[async_trait]
impl LlmProvider for CannedLlm {
    fn name(&self) -> &str {
        "canned"
    }

    fn model(&self) -> &str {
        "canned-1"
    }

    async fn complete(&self, request: &CompletionRequest) -> LlmResult<CompletionResponse> {
        let prompt = &request.messages[0].content;
        let text = if prompt.contains("Dear") {
            "The text is formal."
        } else {
            "The text is informal."
        };
        Ok(CompletionResponse {
            text: text.to_string(),
            tokens_used: TokenUsage::default(),
            finish_reason: FinishReason::Stop,
        })
    }
}

struct FailingFormality;

#[async_trait]
impl FormalityProvider for FailingFormality {
    async fn analyze_formality(&self, _text: &str) -> AnalysisResult<FormalityVerdict> {
        Err(AnalysisError::Authentication("invalid api token".to_string()))
    }
}

// ============================================================================
// Analysis
// ============================================================================

#[tokio::test]
async fn report_is_ordered_and_failures_are_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("Scan.PNG");
    std::fs::write(&image, [0x89, b'P', b'N', b'G']).unwrap();

    let service = AnalysisService::new(
        FlakyModeration::default(),
        SlowSentiment,
        LlmFormalityProvider::new(Arc::new(CannedLlm)),
    );

    let draft = DraftEmail::new("  Dear Ms. Smith, thanks for the update.  ").with_attachment(&image);
    let report = service.analyze_draft(&draft).await;

    assert_eq!(
        report.to_string(),
        "Sentiment Analysis Results:\n\
         Overall Sentiment: positive\n\
         Positive=0.90, Neutral=0.07, Negative=0.03\n\
         Sentence: Thanks for the update.\n  Sentiment: positive\n  Positive=0.90, Neutral=0.07, Negative=0.03\n\n\
         Formality Analysis Results:\n\
         Formality Analysis: The text is formal.\n\n\
         Text Moderation Issues:\n\
         Error analyzing text: Invalid response format: connection reset\n\n\
         Image Moderation Issues:\n\
         Sexual (Severity: 2)\n\
         Violence (Severity: 6)"
    );
}

#[tokio::test]
async fn formality_error_is_rendered_inline() {
    let service = AnalysisService::new(FlakyModeration::default(), SlowSentiment, FailingFormality);

    let report = service.analyze_content("hey", None).await;

    assert_eq!(
        report.section(SectionKind::Formality).lines,
        vec!["Error analyzing formality: Authentication failed: invalid api token".to_string()]
    );
    assert_eq!(
        report.section(SectionKind::ImageModeration).to_string(),
        "No image moderation issues detected."
    );
}

#[tokio::test]
async fn non_image_attachment_is_not_moderated() {
    let dir = tempfile::tempdir().unwrap();
    let gif = dir.path().join("party.gif");
    std::fs::write(&gif, b"GIF89a").unwrap();

    let moderation = FlakyModeration::default();
    let service = AnalysisService::new(
        moderation,
        SlowSentiment,
        LlmFormalityProvider::new(Arc::new(CannedLlm)),
    );

    let report = service.analyze_content("", Some(gif.as_path())).await;

    assert!(report.sections().iter().all(|s| s.is_empty()));
}

// ============================================================================
// Mail
// ============================================================================

#[tokio::test]
async fn attachment_name_ignores_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("invoices").join("2024");
    std::fs::create_dir_all(&path).unwrap();
    let file = path.join("march.pdf");
    std::fs::write(&file, b"%PDF-1.4").unwrap();

    let email = OutgoingEmail::new("a@example.com", "b@example.com", "Invoice", "Attached.")
        .with_attachment(&file);
    let raw = build_message(&email).await.unwrap().formatted();
    let text = String::from_utf8_lossy(&raw);

    assert!(text.contains("multipart/mixed"));
    assert!(text.contains("march.pdf"));
    assert!(!text.contains("invoices"));
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn config_roundtrip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("email_config.json");

    let mut config = EmailConfig::default();
    config.remember_send("sender@demomailtrap.com", "team@example.com", "Status");

    save_config(&path, &config).unwrap();
    assert_eq!(load_config(&path).unwrap(), config);
}

#[test]
fn missing_config_is_empty() {
    let config = load_config(Path::new("/nonexistent/dir/email_config.json")).unwrap();
    assert_eq!(config, EmailConfig::default());
}
