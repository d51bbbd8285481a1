//! Persisted email defaults.
//!
//! The whole document is read at startup and rewritten on save. There is no
//! locking against other processes and no schema versioning.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Default location of the config document, relative to the working directory.
pub const CONFIG_FILE: &str = "email_config.json";

/// Keys stored in the named fields of [`EmailConfig`].
const NAMED_KEYS: [&str; 3] = ["sender", "recipient", "subject"];

/// Email defaults remembered between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Last-used sender address; pre-fills the send form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    /// Last-used recipient address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    /// Last-used subject line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Any other string fields found in the document, kept as-is. Never
    /// holds one of the named keys.
    #[serde(flatten)]
    extra: BTreeMap<String, String>,
}

impl EmailConfig {
    /// Records the fields of a successful send.
    pub fn remember_send(&mut self, sender: &str, recipient: &str, subject: &str) {
        self.sender = Some(sender.to_string());
        self.recipient = Some(recipient.to_string());
        self.subject = Some(subject.to_string());
    }

    /// Fields other than the named ones.
    pub fn extra(&self) -> &BTreeMap<String, String> {
        &self.extra
    }

    /// Sets an extra field. Named keys must go through their own fields.
    pub fn set_extra(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), ConfigError> {
        let key = key.into();
        if NAMED_KEYS.contains(&key.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "{} is a named config field",
                key
            )));
        }
        self.extra.insert(key, value.into());
        Ok(())
    }
}

/// Reads the config document at `path`. A missing file yields the default config.
pub fn load_config(path: impl AsRef<Path>) -> Result<EmailConfig, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No config file, using defaults");
        return Ok(EmailConfig::default());
    }

    let contents = std::fs::read_to_string(path)?;
    let config = serde_json::from_str(&contents)?;
    Ok(config)
}

/// Writes `config` to `path`, replacing the previous document.
pub fn save_config(path: impl AsRef<Path>, config: &EmailConfig) -> Result<(), ConfigError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    tracing::debug!(path = %path.display(), "Saved config");
    Ok(())
}

/// Config document bound to a file path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<EmailConfig, ConfigError> {
        load_config(&self.path)
    }

    pub fn save(&self, config: &EmailConfig) -> Result<(), ConfigError> {
        save_config(&self.path, config)
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(CONFIG_FILE)
    }
}
