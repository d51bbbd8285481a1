//! Remote analysis service adapters.
//!
//! - [`moderation`] - Azure AI Content Safety (text and images)
//! - [`sentiment`] - Azure AI Language sentiment analysis
//! - [`formality`] - formality judgment from a chat model
//! - [`llm`] - chat completion backends (Cohere)
//!
//! Each adapter is a trait with one hosted implementation, so the analysis
//! service can be driven by stubs in tests.

mod error;
pub mod formality;
pub mod llm;
pub mod moderation;
pub mod sentiment;

pub use error::{AnalysisError, AnalysisResult};
pub use formality::{formality_prompt, FormalityProvider, LlmFormalityProvider};
pub use moderation::{ContentSafetyProvider, ModerationProvider};
pub use sentiment::{SentimentProvider, TextAnalyticsProvider};

/// Header carrying the Azure Cognitive Services resource key.
pub(crate) const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
