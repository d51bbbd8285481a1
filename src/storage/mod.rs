//! Credential storage.
//!
//! OS keychain integration, used as the fallback source for service secrets
//! that are not set in the environment.

mod keychain;

pub use keychain::{KeychainAccess, KeychainError, SecretStore};
