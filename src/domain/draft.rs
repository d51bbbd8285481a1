//! Draft email and send outcome types.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Image extensions that qualify an attachment for image moderation.
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "png", "jpeg"];

/// An email being composed. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftEmail {
    /// Plain text body.
    pub body: String,
    /// Optional file to attach.
    pub attachment_path: Option<PathBuf>,
}

impl DraftEmail {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            attachment_path: None,
        }
    }

    /// Sets the attachment. An empty path clears it.
    pub fn with_attachment(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.attachment_path = if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        };
        self
    }

    /// Body with surrounding whitespace removed.
    pub fn trimmed_body(&self) -> &str {
        self.body.trim()
    }

    /// Attachment path, if it names a supported image type.
    pub fn image_attachment(&self) -> Option<&Path> {
        self.attachment_path
            .as_deref()
            .filter(|path| is_image_path(path))
    }

    /// True if any analysis would run: the body is not blank or the
    /// attachment is an image.
    pub fn has_analyzable_content(&self) -> bool {
        !self.trimmed_body().is_empty() || self.image_attachment().is_some()
    }
}

/// Returns true if the file name ends in `.` plus one of [`IMAGE_EXTENSIONS`],
/// ignoring case. A bare `.png` counts.
pub fn is_image_path(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    let name = name.to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| {
        name.strip_suffix(ext)
            .is_some_and(|stem| stem.ends_with('.'))
    })
}

/// Outcome of a single send attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SendResult {
    Sent { message: String },
    Failed { message: String },
}

impl SendResult {
    pub fn sent() -> Self {
        SendResult::Sent {
            message: "Email sent successfully!".to_string(),
        }
    }

    pub fn failed(error: impl fmt::Display) -> Self {
        SendResult::Failed {
            message: format!("Failed to send email: {}", error),
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, SendResult::Sent { .. })
    }

    /// Human-readable message for either outcome.
    pub fn message(&self) -> &str {
        match self {
            SendResult::Sent { message } | SendResult::Failed { message } => message,
        }
    }
}

impl fmt::Display for SendResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
