//! Remote service settings.
//!
//! Endpoints, models, and credentials are read from environment variables at
//! startup. Secrets missing from the environment are looked up in a
//! [`SecretStore`] under the same name.

use std::fmt;

use url::Url;

use super::ConfigError;
use crate::providers::llm::DEFAULT_COHERE_MODEL;
use crate::storage::SecretStore;

pub const CONTENT_SAFETY_ENDPOINT: &str = "CONTENT_SAFETY_ENDPOINT";
pub const CONTENT_SAFETY_KEY: &str = "CONTENT_SAFETY_KEY";
pub const LANGUAGE_ENDPOINT: &str = "LANGUAGE_ENDPOINT";
pub const LANGUAGE_KEY: &str = "LANGUAGE_KEY";
pub const COHERE_API_KEY: &str = "COHERE_API_KEY";
pub const COHERE_MODEL: &str = "COHERE_MODEL";
pub const SMTP_HOST: &str = "SMTP_HOST";
pub const SMTP_PORT: &str = "SMTP_PORT";
pub const SMTP_USERNAME: &str = "SMTP_USERNAME";
pub const SMTP_PASSWORD: &str = "SMTP_PASSWORD";

/// Every secret that may live in the keychain.
pub const SECRET_NAMES: [&str; 4] = [
    CONTENT_SAFETY_KEY,
    LANGUAGE_KEY,
    COHERE_API_KEY,
    SMTP_PASSWORD,
];

const DEFAULT_SMTP_HOST: &str = "live.smtp.mailtrap.io";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_SMTP_USERNAME: &str = "api";

/// A credential whose value is kept out of `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([redacted])")
    }
}

/// Endpoint and key for an Azure Cognitive Services resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureResourceSettings {
    pub endpoint: Url,
    pub api_key: Secret,
}

/// Cohere chat settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CohereSettings {
    pub api_key: Secret,
    pub model: String,
}

/// Settings for the three analysis services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisSettings {
    pub content_safety: AzureResourceSettings,
    pub language: AzureResourceSettings,
    pub cohere: CohereSettings,
}

/// SMTP submission settings. Always STARTTLS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Secret,
}

/// Looks up settings from a variable source and a secret store.
pub struct SettingsResolver<'a, V> {
    vars: V,
    secrets: &'a dyn SecretStore,
}

impl<'a> SettingsResolver<'a, fn(&str) -> Option<String>> {
    /// Resolver backed by the process environment.
    pub fn from_env(secrets: &'a dyn SecretStore) -> Self {
        fn env_var(name: &str) -> Option<String> {
            std::env::var(name).ok()
        }
        Self::new(env_var as fn(&str) -> Option<String>, secrets)
    }
}

impl<'a, V> SettingsResolver<'a, V>
where
    V: Fn(&str) -> Option<String>,
{
    pub fn new(vars: V, secrets: &'a dyn SecretStore) -> Self {
        Self { vars, secrets }
    }

    fn var(&self, name: &str) -> Option<String> {
        (self.vars)(name).filter(|value| !value.trim().is_empty())
    }

    fn required_var(&self, name: &str) -> Result<String, ConfigError> {
        self.var(name)
            .ok_or_else(|| ConfigError::Missing(name.to_string()))
    }

    fn url(&self, name: &str) -> Result<Url, ConfigError> {
        let raw = self.required_var(name)?;
        Url::parse(&raw).map_err(|source| ConfigError::InvalidUrl {
            name: name.to_string(),
            source,
        })
    }

    async fn secret(&self, name: &str) -> Result<Secret, ConfigError> {
        if let Some(value) = self.var(name) {
            return Ok(Secret::new(value));
        }

        match self.secrets.retrieve(name).await? {
            Some(value) if !value.is_empty() => {
                tracing::debug!(name, "Using secret from keychain");
                Ok(Secret::new(value))
            }
            _ => Err(ConfigError::Missing(name.to_string())),
        }
    }

    async fn azure_resource(
        &self,
        endpoint: &str,
        key: &str,
    ) -> Result<AzureResourceSettings, ConfigError> {
        Ok(AzureResourceSettings {
            endpoint: self.url(endpoint)?,
            api_key: self.secret(key).await?,
        })
    }

    /// Resolves settings for the analysis services.
    pub async fn analysis(&self) -> Result<AnalysisSettings, ConfigError> {
        Ok(AnalysisSettings {
            content_safety: self
                .azure_resource(CONTENT_SAFETY_ENDPOINT, CONTENT_SAFETY_KEY)
                .await?,
            language: self.azure_resource(LANGUAGE_ENDPOINT, LANGUAGE_KEY).await?,
            cohere: CohereSettings {
                api_key: self.secret(COHERE_API_KEY).await?,
                model: self
                    .var(COHERE_MODEL)
                    .unwrap_or_else(|| DEFAULT_COHERE_MODEL.to_string()),
            },
        })
    }

    /// Resolves SMTP settings, falling back to the Mailtrap defaults.
    pub async fn smtp(&self) -> Result<SmtpSettings, ConfigError> {
        let port = match self.var(SMTP_PORT) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("{} must be a port number", SMTP_PORT)))?,
            None => DEFAULT_SMTP_PORT,
        };

        Ok(SmtpSettings {
            host: self
                .var(SMTP_HOST)
                .unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            port,
            username: self
                .var(SMTP_USERNAME)
                .unwrap_or_else(|| DEFAULT_SMTP_USERNAME.to_string()),
            password: self.secret(SMTP_PASSWORD).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::KeychainError;
    use async_trait::async_trait;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemorySecrets(HashMap<String, String>);

    #[async_trait]
    impl SecretStore for MemorySecrets {
        async fn retrieve(&self, key: &str) -> Result<Option<String>, KeychainError> {
            Ok(self.0.get(key).cloned())
        }
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    fn analysis_vars() -> Vec<(&'static str, &'static str)> {
        vec![
            (CONTENT_SAFETY_ENDPOINT, "https://safety.example.com/"),
            (CONTENT_SAFETY_KEY, "cs-key"),
            (LANGUAGE_ENDPOINT, "https://lang.example.com/"),
            (LANGUAGE_KEY, "lang-key"),
            (COHERE_API_KEY, "co-key"),
        ]
    }

    #[tokio::test]
    async fn resolves_analysis_settings_from_vars() {
        let secrets = MemorySecrets::default();
        let resolver = SettingsResolver::new(vars(&analysis_vars()), &secrets);

        let settings = resolver.analysis().await.unwrap();
        assert_eq!(
            settings.content_safety.endpoint.as_str(),
            "https://safety.example.com/"
        );
        assert_eq!(settings.language.api_key.expose(), "lang-key");
        assert_eq!(settings.cohere.model, "command-r-plus-08-2024");
    }

    #[tokio::test]
    async fn falls_back_to_secret_store() {
        let mut pairs = analysis_vars();
        pairs.retain(|(name, _)| *name != COHERE_API_KEY);

        let mut secrets = MemorySecrets::default();
        secrets
            .0
            .insert(COHERE_API_KEY.to_string(), "from-keychain".to_string());

        let resolver = SettingsResolver::new(vars(&pairs), &secrets);
        let settings = resolver.analysis().await.unwrap();
        assert_eq!(settings.cohere.api_key.expose(), "from-keychain");
    }

    #[tokio::test]
    async fn missing_secret_is_reported_by_name() {
        let mut pairs = analysis_vars();
        pairs.retain(|(name, _)| *name != LANGUAGE_KEY);

        let secrets = MemorySecrets::default();
        let resolver = SettingsResolver::new(vars(&pairs), &secrets);

        let err = resolver.analysis().await.unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ref name) if name == LANGUAGE_KEY));
    }

    #[tokio::test]
    async fn invalid_endpoint_is_rejected() {
        let mut pairs = analysis_vars();
        pairs.retain(|(name, _)| *name != LANGUAGE_ENDPOINT);
        pairs.push((LANGUAGE_ENDPOINT, "not a url"));

        let secrets = MemorySecrets::default();
        let resolver = SettingsResolver::new(vars(&pairs), &secrets);

        assert!(matches!(
            resolver.analysis().await,
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn smtp_defaults() {
        let secrets = MemorySecrets::default();
        let resolver = SettingsResolver::new(vars(&[(SMTP_PASSWORD, "pw")]), &secrets);

        let smtp = resolver.smtp().await.unwrap();
        assert_eq!(smtp.host, "live.smtp.mailtrap.io");
        assert_eq!(smtp.port, 587);
        assert_eq!(smtp.username, "api");
        assert_eq!(smtp.password.expose(), "pw");
    }

    #[tokio::test]
    async fn smtp_port_must_be_numeric() {
        let secrets = MemorySecrets::default();
        let resolver = SettingsResolver::new(
            vars(&[(SMTP_PASSWORD, "pw"), (SMTP_PORT, "submission")]),
            &secrets,
        );
        assert!(matches!(resolver.smtp().await, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn secret_debug_is_redacted() {
        let secret = Secret::new("hunter2");
        assert!(!format!("{:?}", secret).contains("hunter2"));
    }
}
