//! Collaborator contracts consumed by the verification services

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::entities::{AuthCredential, UserInfo};
use crate::errors::CollaboratorError;

/// TTL-bound key/value store holding live codes and attempt counters
///
/// Every method is a single atomic operation on the backend. Codes are
/// consumed through `compare_and_delete`, never through `get` + `delete`.
#[async_trait]
pub trait CodeStore: Send + Sync {
    /// Store `value` under `key`, replacing any previous value and TTL
    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CollaboratorError>;

    /// Read the live value under `key`
    async fn get(&self, key: &str) -> Result<Option<String>, CollaboratorError>;

    /// Delete `key` only if it currently holds `expected`
    ///
    /// Returns `true` when this call removed the entry.
    async fn compare_and_delete(&self, key: &str, expected: &str) -> Result<bool, CollaboratorError>;

    /// Increment the counter under `key`, creating it with `ttl` on first use
    async fn increment(&self, key: &str, ttl: Duration) -> Result<u64, CollaboratorError>;

    /// Delete `key`; returns `true` if it existed
    async fn delete(&self, key: &str) -> Result<bool, CollaboratorError>;
}

/// Delivers a code to a destination (SMS gateway, mailer, ...)
#[async_trait]
pub trait ChannelTransport: Send + Sync {
    /// Send `code` to `destination`, optionally rendered into `content`
    ///
    /// Returns the provider's message identifier.
    async fn send(
        &self,
        destination: &str,
        code: &str,
        content: Option<&str>,
    ) -> Result<String, CollaboratorError>;

    /// Provider name for logs
    fn provider_name(&self) -> &str;
}

/// Remote user/credential service
///
/// Lookups return `Ok(None)` when the record does not exist; errors are
/// reserved for the service being unreachable or refusing the call.
#[async_trait]
pub trait CredentialDirectory: Send + Sync {
    async fn credential_by_email(&self, email: &str) -> Result<Option<AuthCredential>, CollaboratorError>;

    async fn credential_by_phone(&self, phone: &str) -> Result<Option<AuthCredential>, CollaboratorError>;

    async fn profile_by_email(&self, email: &str, app_code: &str) -> Result<Option<UserInfo>, CollaboratorError>;

    async fn profile_by_phone(&self, phone: &str, app_code: &str) -> Result<Option<UserInfo>, CollaboratorError>;

    async fn create_credential_by_email(&self, email: &str) -> Result<(), CollaboratorError>;

    async fn create_credential_by_phone(&self, phone: &str) -> Result<(), CollaboratorError>;
}
