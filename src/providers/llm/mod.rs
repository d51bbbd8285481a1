//! Chat completion backends.
//!
//! [`LlmProvider`] covers single-turn chat completion, which is all the
//! formality check uses. [`CohereProvider`] is the hosted implementation.

mod cohere;
mod traits;

pub use cohere::{CohereProvider, DEFAULT_COHERE_MODEL};
pub use traits::{
    CompletionRequest, CompletionResponse, FinishReason, LlmError, LlmProvider, LlmResult,
    Message, Role, TokenUsage,
};
