//! draftcheck - check an email draft before sending it
//!
//! This crate runs a draft through hosted moderation, sentiment, and
//! formality services, aggregates the results into a report, and sends the
//! email over authenticated SMTP.

pub mod config;
pub mod domain;
pub mod providers;
pub mod services;
pub mod storage;

use std::sync::Arc;

use config::{AnalysisSettings, SmtpSettings};
use providers::llm::CohereProvider;
use providers::{ContentSafetyProvider, LlmFormalityProvider, TextAnalyticsProvider};
use services::{AnalysisService, MailService, SmtpTransport};

/// Analysis service wired to the hosted providers.
pub type HostedAnalysisService =
    AnalysisService<ContentSafetyProvider, TextAnalyticsProvider, LlmFormalityProvider>;

/// Builds the analysis service from resolved settings.
pub fn analysis_service(settings: &AnalysisSettings) -> HostedAnalysisService {
    let client = reqwest::Client::new();

    let moderation = ContentSafetyProvider::new(
        settings.content_safety.endpoint.as_str(),
        settings.content_safety.api_key.expose(),
    )
    .with_client(client.clone());

    let sentiment = TextAnalyticsProvider::new(
        settings.language.endpoint.as_str(),
        settings.language.api_key.expose(),
    )
    .with_client(client.clone());

    let llm = CohereProvider::new(
        settings.cohere.api_key.expose(),
        settings.cohere.model.clone(),
    )
    .with_client(client);

    AnalysisService::new(
        moderation,
        sentiment,
        LlmFormalityProvider::new(Arc::new(llm)),
    )
}

/// Builds the mail service from resolved SMTP settings.
pub fn mail_service(settings: SmtpSettings) -> MailService<SmtpTransport> {
    MailService::new(SmtpTransport::new(settings))
}
