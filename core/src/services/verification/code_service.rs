//! Code issuance: generate, dispatch, persist

use std::sync::Arc;
use tracing::{error, info};

use crate::domain::entities::verification_code::{generate_secure_code, IssuedCode};
use crate::domain::value_objects::VerificationRequest;
use crate::errors::VerificationResult;

use super::config::VerificationServiceConfig;
use super::deadline::Deadline;
use super::registry::StrategyRegistry;

/// Issues verification codes over any registered channel
pub struct CodeService {
    registry: Arc<StrategyRegistry>,
    config: VerificationServiceConfig,
}

impl CodeService {
    pub fn new(registry: Arc<StrategyRegistry>, config: VerificationServiceConfig) -> Self {
        Self { registry, config }
    }

    /// Issue a fresh code for `request`
    ///
    /// This method:
    /// 1. Resolves the channel strategy (unknown channels fail before any side effect)
    /// 2. Validates the destination
    /// 3. Generates a code from the OS CSPRNG
    /// 4. Dispatches it through the channel transport
    /// 5. Persists it, replacing any earlier code for the same destination
    ///
    /// When dispatch fails nothing is written to the store. Dispatch itself
    /// is never retried.
    ///
    /// The returned [`IssuedCode`] carries the code itself; callers must not
    /// echo it back to the requester.
    pub async fn issue_code(&self, request: &VerificationRequest) -> VerificationResult<IssuedCode> {
        let strategy = self.registry.resolve_code(request.channel)?;
        let channel = strategy.channel();
        let destination = request.account_number.as_str();
        strategy.validate_destination(destination)?;

        let deadline = Deadline::after(self.config.request_timeout);
        let code = generate_secure_code(self.config.code_length);
        let issued = IssuedCode::new(channel, destination, code, strategy.slots().ttl());

        info!(
            channel = %channel,
            destination = %channel.mask(destination),
            app_code = %request.app_code,
            issuance_id = %issued.id,
            event = "otp_generated",
            "Generated new verification code"
        );

        let message_id = match strategy
            .dispatch(destination, &issued.code, request.content.as_deref(), &deadline)
            .await
        {
            Ok(message_id) => message_id,
            Err(err) => {
                error!(
                    channel = %channel,
                    destination = %channel.mask(destination),
                    issuance_id = %issued.id,
                    error = %err,
                    event = "otp_issuance_aborted",
                    "Dispatch failed, verification code discarded"
                );
                return Err(err);
            }
        };

        strategy.persist(destination, &issued.code, &deadline).await.map_err(|err| {
            error!(
                channel = %channel,
                destination = %channel.mask(destination),
                issuance_id = %issued.id,
                error = %err,
                event = "otp_storage_failed",
                "Failed to store dispatched verification code"
            );
            err
        })?;

        info!(
            channel = %channel,
            destination = %channel.mask(destination),
            issuance_id = %issued.id,
            message_id = %message_id,
            expires_at = %issued.expires_at,
            event = "otp_issued",
            "Verification code issued"
        );

        Ok(issued)
    }
}
