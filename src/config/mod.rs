//! Configuration and settings management.
//!
//! - [`store`] persists the email defaults as a JSON document.
//! - [`settings`] resolves remote service endpoints and credentials from the
//!   environment, with the OS keychain as a fallback for secrets.

pub mod settings;
pub mod store;

use thiserror::Error;

use crate::storage::KeychainError;

pub use settings::{
    AnalysisSettings, AzureResourceSettings, CohereSettings, Secret, SettingsResolver,
    SmtpSettings, SECRET_NAMES,
};
pub use store::{load_config, save_config, ConfigStore, EmailConfig, CONFIG_FILE};

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing setting: {0} is not set in the environment or keychain")]
    Missing(String),

    #[error("Invalid URL in {name}: {source}")]
    InvalidUrl {
        name: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid setting: {0}")]
    Invalid(String),

    #[error(transparent)]
    Keychain(#[from] KeychainError),
}
