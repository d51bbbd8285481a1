//! Domain types for draftcheck.
//!
//! Drafts, send outcomes, and the results returned by the analysis services.

mod analysis;
mod draft;

pub use analysis::{
    ConfidenceScores, FormalityVerdict, ModerationFinding, SentenceSentiment, SentimentLabel,
    SentimentReport,
};
pub use draft::{is_image_path, DraftEmail, SendResult, IMAGE_EXTENSIONS};
