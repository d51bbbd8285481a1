//! Results produced by the analysis services.
//!
//! Each result type knows how to render itself as the display lines that make
//! up one section of the analysis report.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A moderation category the classifier flagged, with its severity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationFinding {
    /// Risk class, e.g. "Hate" or "Violence".
    pub category: String,
    /// Severity assigned by the service. Zero means not flagged.
    pub severity: u32,
}

impl ModerationFinding {
    pub fn new(category: impl Into<String>, severity: u32) -> Self {
        Self {
            category: category.into(),
            severity,
        }
    }
}

impl fmt::Display for ModerationFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Severity: {})", self.category, self.severity)
    }
}

/// Overall sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
    Mixed,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Mixed => "mixed",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Positive/neutral/negative confidence triple.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceScores {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

impl ConfidenceScores {
    pub fn new(positive: f64, neutral: f64, negative: f64) -> Self {
        Self {
            positive,
            neutral,
            negative,
        }
    }
}

impl fmt::Display for ConfidenceScores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Positive={:.2}, Neutral={:.2}, Negative={:.2}",
            self.positive, self.neutral, self.negative
        )
    }
}

/// Sentiment of one sentence within the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceSentiment {
    pub text: String,
    pub label: SentimentLabel,
    pub scores: ConfidenceScores,
}

/// Document-level sentiment with a per-sentence breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentReport {
    pub overall_label: SentimentLabel,
    pub scores: ConfidenceScores,
    /// Sentences in document order.
    pub sentences: Vec<SentenceSentiment>,
}

impl SentimentReport {
    /// Renders the report as display lines.
    ///
    /// A sentence entry spans several physical lines but is a single item.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.sentences.len() + 2);
        lines.push(format!("Overall Sentiment: {}", self.overall_label));
        lines.push(self.scores.to_string());
        lines.extend(self.sentences.iter().map(|sentence| {
            format!(
                "Sentence: {}\n  Sentiment: {}\n  {}",
                sentence.text, sentence.label, sentence.scores
            )
        }));
        lines
    }
}

/// Free-text formality judgment from a language model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormalityVerdict {
    pub raw_text: String,
}

impl FormalityVerdict {
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        vec![format!("Formality Analysis: {}", self.raw_text)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finding_display() {
        let finding = ModerationFinding::new("Violence", 4);
        assert_eq!(finding.to_string(), "Violence (Severity: 4)");
    }

    #[test]
    fn scores_use_two_decimals() {
        let scores = ConfidenceScores::new(0.9, 0.07, 0.03);
        assert_eq!(
            scores.to_string(),
            "Positive=0.90, Neutral=0.07, Negative=0.03"
        );

        let rounded = ConfidenceScores::new(0.333333, 0.666667, 0.0);
        assert_eq!(
            rounded.to_string(),
            "Positive=0.33, Neutral=0.67, Negative=0.00"
        );
    }

    #[test]
    fn sentiment_label_serialization() {
        let mixed: SentimentLabel = serde_json::from_str("\"mixed\"").unwrap();
        assert_eq!(mixed, SentimentLabel::Mixed);
        assert_eq!(
            serde_json::to_string(&SentimentLabel::Negative).unwrap(),
            "\"negative\""
        );
    }

    #[test]
    fn sentiment_report_lines() {
        let report = SentimentReport {
            overall_label: SentimentLabel::Positive,
            scores: ConfidenceScores::new(0.9, 0.07, 0.03),
            sentences: vec![SentenceSentiment {
                text: "Thanks so much!".to_string(),
                label: SentimentLabel::Positive,
                scores: ConfidenceScores::new(0.99, 0.01, 0.0),
            }],
        };

        let lines = report.lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Overall Sentiment: positive");
        assert_eq!(lines[1], "Positive=0.90, Neutral=0.07, Negative=0.03");
        assert_eq!(
            lines[2],
            "Sentence: Thanks so much!\n  Sentiment: positive\n  Positive=0.99, Neutral=0.01, Negative=0.00"
        );
    }

    #[test]
    fn formality_lines() {
        let verdict = FormalityVerdict::new("The text is informal.");
        assert_eq!(
            verdict.lines(),
            vec!["Formality Analysis: The text is informal.".to_string()]
        );
    }
}
