//! Configuration for the verification services

use std::time::Duration;

use vc_shared::config::VerificationConfig;

use crate::domain::entities::verification_code::{CODE_LENGTH, DEFAULT_EXPIRATION_MINUTES, MAX_ATTEMPTS};
use crate::domain::entities::Channel;

/// Configuration for the verification services
#[derive(Debug, Clone)]
pub struct VerificationServiceConfig {
    /// Number of digits in an issued code
    pub code_length: usize,
    /// Lifetime of a phone code
    pub phone_code_ttl: Duration,
    /// Lifetime of an email code
    pub email_code_ttl: Duration,
    /// Wrong guesses allowed before the code is burned
    pub max_attempts: u32,
    /// Budget for all remote calls made while serving one request
    pub request_timeout: Duration,
    /// Retries for idempotent directory lookups
    pub lookup_max_retries: u32,
    /// Base backoff between lookup retries, doubled per attempt
    pub lookup_retry_delay: Duration,
}

impl VerificationServiceConfig {
    /// TTL applied to codes of `channel`
    pub fn ttl_for(&self, channel: Channel) -> Duration {
        match channel {
            Channel::Email => self.email_code_ttl,
            Channel::Phone => self.phone_code_ttl,
        }
    }
}

impl Default for VerificationServiceConfig {
    fn default() -> Self {
        Self {
            code_length: CODE_LENGTH,
            phone_code_ttl: Duration::from_secs(DEFAULT_EXPIRATION_MINUTES * 60),
            email_code_ttl: Duration::from_secs(DEFAULT_EXPIRATION_MINUTES * 60),
            max_attempts: MAX_ATTEMPTS,
            request_timeout: Duration::from_secs(5),
            lookup_max_retries: 2,
            lookup_retry_delay: Duration::from_millis(100),
        }
    }
}

impl From<&VerificationConfig> for VerificationServiceConfig {
    fn from(config: &VerificationConfig) -> Self {
        Self {
            code_length: config.code_length.max(1),
            phone_code_ttl: Duration::from_secs(config.phone_code_ttl_minutes * 60),
            email_code_ttl: Duration::from_secs(config.email_code_ttl_minutes * 60),
            max_attempts: config.max_attempts.max(1),
            request_timeout: Duration::from_millis(config.remote_timeout_ms),
            lookup_max_retries: config.remote_max_retries,
            lookup_retry_delay: Duration::from_millis(config.remote_retry_delay_ms),
        }
    }
}
