//! Verification: compare, consume, resolve or create the credential

use constant_time_eq::constant_time_eq;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::entities::verification_code::is_well_formed;
use crate::domain::value_objects::CertificateOutcome;
use crate::errors::{VerificationError, VerificationResult};

use super::config::VerificationServiceConfig;
use super::deadline::Deadline;
use super::registry::StrategyRegistry;
use super::strategy::ChannelStrategy;

/// Verifies codes and resolves the verified destination to an identity
pub struct CertificateService {
    registry: Arc<StrategyRegistry>,
    config: VerificationServiceConfig,
}

impl CertificateService {
    pub fn new(registry: Arc<StrategyRegistry>, config: VerificationServiceConfig) -> Self {
        Self { registry, config }
    }

    /// Verify `code` for `destination` and resolve its credential
    ///
    /// This method:
    /// 1. Resolves the channel strategy and validates the destination
    /// 2. Fetches the live code (`CodeNotFoundOrExpired` when absent)
    /// 3. Reserves an attempt slot; once the budget is spent the code is burned
    ///    without comparing
    /// 4. Compares `code` in constant time; the last allowed miss burns the code
    /// 5. On match consumes the code with an atomic compare-and-delete
    /// 6. Fetches the credential, creating it when the destination is new,
    ///    then fetches the profile for `app_code`
    ///
    /// The code is consumed before the directory is contacted, so concurrent
    /// requests holding the same code reach step 6 at most once between them.
    pub async fn verify(
        &self,
        channel_code: i32,
        destination: &str,
        code: &str,
        app_code: &str,
    ) -> VerificationResult<CertificateOutcome> {
        let strategy = self.registry.resolve_code(channel_code)?;
        let channel = strategy.channel();
        strategy.validate_destination(destination)?;

        let deadline = Deadline::after(self.config.request_timeout);
        let stored = strategy.fetch_code(destination, &deadline).await.map_err(|err| {
            if matches!(err, VerificationError::CodeNotFoundOrExpired) {
                warn!(
                    channel = %channel,
                    destination = %channel.mask(destination),
                    event = "otp_not_found",
                    "Verification code expired or not found"
                );
            }
            err
        })?;

        let attempts = strategy.slots().reserve_attempt(destination, &deadline).await?;
        if attempts > u64::from(self.config.max_attempts) {
            return Err(self.exhaust(strategy, destination, &stored, attempts, &deadline).await);
        }

        let matches = is_well_formed(code, self.config.code_length)
            && Self::constant_time_compare(&stored, code);
        if !matches {
            return Err(self
                .handle_mismatch(strategy, destination, &stored, attempts, &deadline)
                .await);
        }

        if !strategy.consume_code(destination, &stored, &deadline).await? {
            warn!(
                channel = %channel,
                destination = %channel.mask(destination),
                event = "otp_consume_lost",
                "Verification code was consumed or replaced concurrently"
            );
            return Err(VerificationError::CodeNotFoundOrExpired);
        }
        strategy.slots().clear_attempts(destination, &deadline).await;

        info!(
            channel = %channel,
            destination = %channel.mask(destination),
            event = "otp_verified_success",
            "Verification code successfully verified"
        );

        self.resolve_identity(strategy, destination, app_code, &deadline).await
    }

    /// Build the error for a wrong guess that used attempt number `attempts`
    async fn handle_mismatch(
        &self,
        strategy: &ChannelStrategy,
        destination: &str,
        stored: &str,
        attempts: u64,
        deadline: &Deadline,
    ) -> VerificationError {
        let max_attempts = self.config.max_attempts;
        if attempts >= u64::from(max_attempts) {
            return self.exhaust(strategy, destination, stored, attempts, deadline).await;
        }

        let channel = strategy.channel();
        let remaining_attempts = max_attempts - attempts as u32;
        warn!(
            channel = %channel,
            destination = %channel.mask(destination),
            remaining_attempts = remaining_attempts,
            event = "otp_verification_failed",
            "Verification code mismatch"
        );
        VerificationError::VerificationMismatch { remaining_attempts }
    }

    /// Burn the code once its attempt budget is spent
    async fn exhaust(
        &self,
        strategy: &ChannelStrategy,
        destination: &str,
        stored: &str,
        attempts: u64,
        deadline: &Deadline,
    ) -> VerificationError {
        let channel = strategy.channel();
        warn!(
            channel = %channel,
            destination = %channel.mask(destination),
            attempts = attempts,
            event = "max_attempts_exceeded",
            "Maximum verification attempts exceeded, code invalidated"
        );
        if let Err(err) = strategy.slots().invalidate(destination, stored, deadline).await {
            return err;
        }
        VerificationError::AttemptsExceeded {
            max_attempts: self.config.max_attempts,
        }
    }

    /// Fetch the credential for a verified destination, creating it if needed
    async fn resolve_identity(
        &self,
        strategy: &ChannelStrategy,
        destination: &str,
        app_code: &str,
        deadline: &Deadline,
    ) -> VerificationResult<CertificateOutcome> {
        let channel = strategy.channel();
        let (credential, created) = match strategy.resolve_credential(destination, deadline).await? {
            Some(credential) => (credential, false),
            None => {
                strategy.create_credential(destination, deadline).await?;
                info!(
                    channel = %channel,
                    destination = %channel.mask(destination),
                    event = "credential_created",
                    "Created credential for newly verified destination"
                );
                let credential = strategy
                    .resolve_credential(destination, deadline)
                    .await?
                    .ok_or_else(|| VerificationError::NotFound {
                        resource: format!("{} credential", channel),
                    })?;
                (credential, true)
            }
        };

        let profile = strategy.resolve_profile(destination, app_code, deadline).await?;

        Ok(CertificateOutcome {
            credential,
            profile,
            created,
        })
    }

    /// Constant-time comparison of two codes
    fn constant_time_compare(code_a: &str, code_b: &str) -> bool {
        if code_a.len() != code_b.len() {
            return false;
        }
        constant_time_eq(code_a.as_bytes(), code_b.as_bytes())
    }
}
