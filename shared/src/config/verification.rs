//! Verification behaviour configuration

use serde::{Deserialize, Serialize};

use super::env_or;

/// Deployment-wide verification settings
///
/// TTLs are expressed in minutes and fixed per channel; remote limits apply
/// to every transport, directory and store call made while serving a request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Number of digits in an issued code
    pub code_length: usize,
    /// Lifetime of a phone code in minutes
    pub phone_code_ttl_minutes: u64,
    /// Lifetime of an email code in minutes
    pub email_code_ttl_minutes: u64,
    /// Wrong guesses allowed per issued code before it is burned
    pub max_attempts: u32,
    /// Overall budget for one issue/verify request in milliseconds
    pub remote_timeout_ms: u64,
    /// Retries for idempotent directory lookups
    pub remote_max_retries: u32,
    /// Base backoff between lookup retries in milliseconds
    pub remote_retry_delay_ms: u64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            code_length: 6,
            phone_code_ttl_minutes: 5,
            email_code_ttl_minutes: 5,
            max_attempts: 3,
            remote_timeout_ms: 5_000,
            remote_max_retries: 2,
            remote_retry_delay_ms: 100,
        }
    }
}

impl VerificationConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            code_length: env_or("CODE_LENGTH", defaults.code_length),
            phone_code_ttl_minutes: env_or("PHONE_CODE_TTL_MINUTES", defaults.phone_code_ttl_minutes),
            email_code_ttl_minutes: env_or("EMAIL_CODE_TTL_MINUTES", defaults.email_code_ttl_minutes),
            max_attempts: env_or("MAX_VERIFY_ATTEMPTS", defaults.max_attempts),
            remote_timeout_ms: env_or("REMOTE_TIMEOUT_MS", defaults.remote_timeout_ms),
            remote_max_retries: env_or("REMOTE_MAX_RETRIES", defaults.remote_max_retries),
            remote_retry_delay_ms: env_or("REMOTE_RETRY_DELAY_MS", defaults.remote_retry_delay_ms),
        }
    }
}
