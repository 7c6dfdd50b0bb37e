//! Credential-store collaborator boundary.
//!
//! One named secret, persisted by the host across sessions. Reads are
//! idempotent: repeated `get` calls return the same value until a `set`
//! changes it.

use async_trait::async_trait;

/// Errors from the host's secret storage.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("credential store failure: {0}")]
    Storage(String),
}

/// Asynchronous access to a single named secret string.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read the secret stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Persist `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}
