//! The "Analyze Content" action.
//!
//! [`AnalysisService`] runs sentiment, formality, and text moderation over the
//! draft body, and image moderation over a qualifying attachment. The calls
//! run concurrently; the report always lists the sections in the same order.
//! A failing service becomes an error line in its own section and does not
//! affect the others.

use std::fmt;
use std::path::Path;

use crate::domain::{is_image_path, DraftEmail, ModerationFinding};
use crate::providers::{
    AnalysisError, AnalysisResult, FormalityProvider, ModerationProvider, SentimentProvider,
};

/// One section of the analysis report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Sentiment,
    Formality,
    TextModeration,
    ImageModeration,
}

impl SectionKind {
    /// Report order.
    pub const ALL: [SectionKind; 4] = [
        SectionKind::Sentiment,
        SectionKind::Formality,
        SectionKind::TextModeration,
        SectionKind::ImageModeration,
    ];

    pub fn heading(&self) -> &'static str {
        match self {
            SectionKind::Sentiment => "Sentiment Analysis Results:",
            SectionKind::Formality => "Formality Analysis Results:",
            SectionKind::TextModeration => "Text Moderation Issues:",
            SectionKind::ImageModeration => "Image Moderation Issues:",
        }
    }

    /// Shown instead of the heading when the section has no lines.
    pub fn placeholder(&self) -> &'static str {
        match self {
            SectionKind::Sentiment => "No sentiment analysis performed.",
            SectionKind::Formality => "No formality analysis performed.",
            SectionKind::TextModeration => "No text moderation issues detected.",
            SectionKind::ImageModeration => "No image moderation issues detected.",
        }
    }

    fn error_prefix(&self) -> &'static str {
        match self {
            SectionKind::Sentiment => "Error analyzing sentiment",
            SectionKind::Formality => "Error analyzing formality",
            SectionKind::TextModeration => "Error analyzing text",
            SectionKind::ImageModeration => "Error analyzing image",
        }
    }
}

/// A rendered report section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSection {
    pub kind: SectionKind,
    pub lines: Vec<String>,
}

impl ReportSection {
    fn new(kind: SectionKind, lines: Vec<String>) -> Self {
        Self { kind, lines }
    }

    /// Builds a section from an optional adapter result. `None` means the
    /// analysis was skipped.
    fn from_outcome<T>(
        kind: SectionKind,
        outcome: Option<AnalysisResult<T>>,
        render: impl FnOnce(T) -> Vec<String>,
    ) -> Self {
        let lines = match outcome {
            None => Vec::new(),
            Some(Ok(value)) => render(value),
            Some(Err(e)) => {
                tracing::warn!(section = kind.heading(), error = %e, "Analysis failed");
                vec![format!("{}: {}", kind.error_prefix(), e)]
            }
        };
        Self::new(kind, lines)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for ReportSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lines.is_empty() {
            return f.write_str(self.kind.placeholder());
        }
        write!(f, "{}\n{}", self.kind.heading(), self.lines.join("\n"))
    }
}

/// The aggregated result of one analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisReport {
    sections: [ReportSection; 4],
}

impl AnalysisReport {
    /// A report where every analysis was skipped.
    pub fn empty() -> Self {
        Self {
            sections: SectionKind::ALL.map(|kind| ReportSection::new(kind, Vec::new())),
        }
    }

    pub fn sections(&self) -> &[ReportSection] {
        &self.sections
    }

    pub fn section(&self, kind: SectionKind) -> &ReportSection {
        &self.sections[kind as usize]
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                f.write_str("\n\n")?;
            }
            write!(f, "{}", section)?;
        }
        Ok(())
    }
}

fn moderation_lines(findings: Vec<ModerationFinding>) -> Vec<String> {
    findings.iter().map(ToString::to_string).collect()
}

/// Runs the analysis adapters over a draft and assembles the report.
pub struct AnalysisService<M, S, F> {
    moderation: M,
    sentiment: S,
    formality: F,
}

impl<M, S, F> AnalysisService<M, S, F>
where
    M: ModerationProvider,
    S: SentimentProvider,
    F: FormalityProvider,
{
    pub fn new(moderation: M, sentiment: S, formality: F) -> Self {
        Self {
            moderation,
            sentiment,
            formality,
        }
    }

    /// Analyzes a draft's body and attachment.
    pub async fn analyze_draft(&self, draft: &DraftEmail) -> AnalysisReport {
        self.analyze_content(&draft.body, draft.attachment_path.as_deref())
            .await
    }

    /// Analyzes `text` and, if it is a supported image, the file at
    /// `attachment_path`.
    ///
    /// Text analyses are skipped when `text` is blank. Image moderation runs
    /// only for `.jpg`, `.jpeg`, and `.png` files, matched case-insensitively.
    pub async fn analyze_content(
        &self,
        text: &str,
        attachment_path: Option<&Path>,
    ) -> AnalysisReport {
        let text = text.trim();
        let analyze_text = !text.is_empty();
        let image_path = attachment_path.filter(|path| is_image_path(path));

        tracing::debug!(
            analyze_text,
            analyze_image = image_path.is_some(),
            "Starting content analysis"
        );

        let sentiment = async {
            if analyze_text {
                Some(self.sentiment.analyze_sentiment(text).await)
            } else {
                None
            }
        };
        let formality = async {
            if analyze_text {
                Some(self.formality.analyze_formality(text).await)
            } else {
                None
            }
        };
        let text_moderation = async {
            if analyze_text {
                Some(self.moderation.analyze_text(text).await)
            } else {
                None
            }
        };
        let image_moderation = async {
            match image_path {
                Some(path) => Some(self.moderate_image(path).await),
                None => None,
            }
        };

        let (sentiment, formality, text_moderation, image_moderation) =
            tokio::join!(sentiment, formality, text_moderation, image_moderation);

        AnalysisReport {
            sections: [
                ReportSection::from_outcome(SectionKind::Sentiment, sentiment, |report| {
                    report.lines()
                }),
                ReportSection::from_outcome(SectionKind::Formality, formality, |verdict| {
                    verdict.lines()
                }),
                ReportSection::from_outcome(
                    SectionKind::TextModeration,
                    text_moderation,
                    moderation_lines,
                ),
                ReportSection::from_outcome(
                    SectionKind::ImageModeration,
                    image_moderation,
                    moderation_lines,
                ),
            ],
        }
    }

    async fn moderate_image(&self, path: &Path) -> AnalysisResult<Vec<ModerationFinding>> {
        let bytes = tokio::fs::read(path).await.map_err(AnalysisError::Io)?;
        self.moderation.analyze_image(&bytes).await
    }
}
