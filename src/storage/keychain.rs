//! Keychain access for API keys and the SMTP password.
//!
//! Wraps the keyring crate to provide OS-native credential storage. Secrets are
//! stored under the name of the environment variable they stand in for, so
//! `CONTENT_SAFETY_KEY` can come from either place.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during keychain operations.
#[derive(Debug, Error)]
pub enum KeychainError {
    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Credential not found: {0}")]
    NotFound(String),

    #[error("Credential {0} was not persisted by the keychain")]
    NotPersisted(String),

    #[error("Failed to spawn blocking task: {0}")]
    TaskFailed(String),
}

/// Result type for keychain operations.
pub type Result<T> = std::result::Result<T, KeychainError>;

/// Read access to stored secrets.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Returns the secret stored under `key`, or `None` if there is none.
    async fn retrieve(&self, key: &str) -> Result<Option<String>>;
}

/// Provides access to the OS keychain.
#[derive(Debug, Clone)]
pub struct KeychainAccess {
    service_name: String,
}

impl KeychainAccess {
    /// Default service name for draftcheck credentials.
    pub const DEFAULT_SERVICE: &'static str = "io.draftcheck.app";

    /// Creates a new KeychainAccess with the default service name.
    pub fn new() -> Self {
        Self {
            service_name: Self::DEFAULT_SERVICE.to_string(),
        }
    }

    /// Creates a new KeychainAccess with a custom service name.
    pub fn with_service(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    /// Stores a secret, overwriting any existing value.
    ///
    /// The value is read back through a fresh entry; a store that does not
    /// persist it is an error.
    pub async fn store(&self, key: &str, value: &str) -> Result<()> {
        let service = self.service_name.clone();
        let key = key.to_string();
        let value = value.to_string();

        tokio::task::spawn_blocking(move || {
            keyring::Entry::new(&service, &key)?.set_password(&value)?;

            let found = match keyring::Entry::new(&service, &key)?.get_password() {
                Ok(password) => Some(password),
                Err(keyring::Error::NoEntry) => None,
                Err(e) => return Err(KeychainError::Keyring(e)),
            };
            check_persisted(&key, &value, found)
        })
        .await
        .map_err(|e| KeychainError::TaskFailed(e.to_string()))?
    }

    /// Deletes a secret. Errors if it does not exist.
    pub async fn delete(&self, key: &str) -> Result<()> {
        let service = self.service_name.clone();
        let key = key.to_string();

        tokio::task::spawn_blocking(move || {
            let entry = keyring::Entry::new(&service, &key)?;
            match entry.delete_credential() {
                Ok(()) => Ok(()),
                Err(keyring::Error::NoEntry) => Err(KeychainError::NotFound(key)),
                Err(e) => Err(KeychainError::Keyring(e)),
            }
        })
        .await
        .map_err(|e| KeychainError::TaskFailed(e.to_string()))?
    }

    /// Returns the service name used for this keychain access.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

fn check_persisted(key: &str, expected: &str, found: Option<String>) -> Result<()> {
    match found {
        Some(value) if value == expected => Ok(()),
        _ => Err(KeychainError::NotPersisted(key.to_string())),
    }
}

impl Default for KeychainAccess {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SecretStore for KeychainAccess {
    async fn retrieve(&self, key: &str) -> Result<Option<String>> {
        let service = self.service_name.clone();
        let key = key.to_string();

        tokio::task::spawn_blocking(move || {
            let entry = keyring::Entry::new(&service, &key)?;
            match entry.get_password() {
                Ok(password) => Ok(Some(password)),
                Err(keyring::Error::NoEntry) => Ok(None),
                Err(e) => Err(KeychainError::Keyring(e)),
            }
        })
        .await
        .map_err(|e| KeychainError::TaskFailed(e.to_string()))?
    }
}
